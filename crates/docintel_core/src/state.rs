use std::collections::VecDeque;

use crate::model::{
    Analysis, DocumentId, DocumentRecord, DocumentStats, FileInfo, SaveRequest, SelectedFile,
    Summary, SummaryLength, SummaryType,
};
use crate::view_model::{AppViewModel, DisplayedDocument, HistoryRowView, HistoryView};

/// Correlates an effect with the message that completes it.
pub type RequestId = u64;

/// Number of history entries kept in the local cache.
pub const HISTORY_WINDOW: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
    Extracting,
    Summarizing,
    Analyzing,
    Ready,
    Error,
}

impl Phase {
    /// True while a request chain is in flight.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            Phase::Uploading | Phase::Extracting | Phase::Summarizing | Phase::Analyzing
        )
    }

    /// Phases from which a new user action may start.
    pub fn accepts_action(self) -> bool {
        matches!(self, Phase::Idle | Phase::Ready | Phase::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Uploading => "uploading",
            Phase::Extracting => "extracting",
            Phase::Summarizing => "summarizing",
            Phase::Analyzing => "analyzing",
            Phase::Ready => "ready",
            Phase::Error => "error",
        }
    }
}

/// User-initiated action driving the processing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Process,
    Summarize,
    Analyze,
}

impl Action {
    pub(crate) fn failure_prefix(self) -> &'static str {
        match self {
            Action::Process => "Upload failed",
            Action::Summarize => "Summary failed",
            Action::Analyze => "Analysis failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Upload,
    Extract,
    Summarize,
    Analyze,
    Save,
}

impl Step {
    /// Phase shown while the step runs. Saving keeps the previous phase.
    pub fn phase(self) -> Option<Phase> {
        match self {
            Step::Upload => Some(Phase::Uploading),
            Step::Extract => Some(Phase::Extracting),
            Step::Summarize => Some(Phase::Summarizing),
            Step::Analyze => Some(Phase::Analyzing),
            Step::Save => None,
        }
    }

    /// A failed critical step aborts the action; other failures skip the step.
    pub fn is_critical_for(self, action: Action) -> bool {
        match action {
            Action::Process => matches!(self, Step::Upload | Step::Extract),
            Action::Summarize => self == Step::Summarize,
            Action::Analyze => self == Step::Analyze,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pipeline {
    pub(crate) action: Action,
    pub(crate) request: RequestId,
    pub(crate) current: Option<Step>,
    pub(crate) planned: Vec<Step>,
    pub(crate) remaining: VecDeque<Step>,
    pub(crate) total: usize,
    pub(crate) completed: usize,
    pub(crate) summary_type: SummaryType,
    pub(crate) length: SummaryLength,
    pub(crate) upload: Option<SelectedFile>,
    pub(crate) uploaded_text: Option<String>,
    pub(crate) skipped: Vec<Step>,
    pub(crate) saved: bool,
}

impl Pipeline {
    pub(crate) fn new(
        action: Action,
        steps: Vec<Step>,
        summary_type: SummaryType,
        length: SummaryLength,
    ) -> Self {
        Self {
            action,
            request: 0,
            current: None,
            total: steps.len(),
            remaining: steps.iter().copied().collect(),
            planned: steps,
            completed: 0,
            summary_type,
            length,
            upload: None,
            uploaded_text: None,
            skipped: Vec::new(),
            saved: false,
        }
    }

    /// Progress percentage for the step about to run.
    pub(crate) fn progress(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.completed * 100 / self.total).min(100) as u8
    }

    /// True if `step` was planned and did not fail.
    pub(crate) fn succeeded(&self, step: Step) -> bool {
        self.planned.contains(&step) && !self.skipped.contains(&step)
    }
}

/// User preferences applied to the next action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub auto_summarize: bool,
    pub auto_analyze: bool,
    pub analyze_after_summarize: bool,
    /// Save to the backend at the end of the process action.
    pub auto_save: bool,
    pub summary_type: SummaryType,
    pub length: SummaryLength,
    /// Keep a local copy when the backend save fails.
    pub local_mirror: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_summarize: true,
            auto_analyze: true,
            analyze_after_summarize: true,
            auto_save: true,
            summary_type: SummaryType::Standard,
            length: SummaryLength::Medium,
            local_mirror: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient user-facing message (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct History {
    pub(crate) entries: Vec<DocumentRecord>,
    pub(crate) query: String,
    pub(crate) search_results: Option<Vec<DocumentRecord>>,
    pub(crate) refresh_trigger: u64,
    pub(crate) selected: Option<DocumentRecord>,
    pub(crate) stats: Option<DocumentStats>,
}

impl History {
    pub(crate) fn set_entries(&mut self, mut entries: Vec<DocumentRecord>) {
        // Newest first; ties keep backend order.
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(HISTORY_WINDOW);
        self.entries = entries;
    }

    pub(crate) fn remove(&mut self, id: DocumentId) {
        self.entries.retain(|doc| doc.id != id);
        if let Some(results) = self.search_results.as_mut() {
            results.retain(|doc| doc.id != id);
        }
        if self.selected.as_ref().is_some_and(|doc| doc.id == id) {
            self.selected = None;
        }
    }

    fn visible(&self) -> &[DocumentRecord] {
        self.search_results.as_deref().unwrap_or(&self.entries)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) phase: Phase,
    pub(crate) progress: u8,
    pub(crate) file: Option<FileInfo>,
    pub(crate) extracted_text: String,
    pub(crate) summary: Option<Summary>,
    pub(crate) analysis: Option<Analysis>,
    pub(crate) pipeline: Option<Pipeline>,
    pub(crate) last_request: RequestId,
    pub(crate) preferences: Preferences,
    pub(crate) history: History,
    pub(crate) backend_online: Option<bool>,
    pub(crate) last_error: Option<String>,
    pub(crate) notices: Vec<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: Preferences) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase.is_busy()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Request id of the step currently in flight, if any.
    pub fn in_flight(&self) -> Option<RequestId> {
        self.pipeline
            .as_ref()
            .filter(|pipeline| pipeline.current.is_some())
            .map(|pipeline| pipeline.request)
    }

    pub fn refresh_trigger(&self) -> u64 {
        self.history.refresh_trigger
    }

    /// Drains queued notices in the order they were raised.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn view(&self) -> AppViewModel {
        let selected_id = self.history.selected.as_ref().map(|doc| doc.id);
        let document = if let Some(doc) = &self.history.selected {
            DisplayedDocument::Historical(doc.clone())
        } else if self.file.is_some() || !self.extracted_text.is_empty() {
            DisplayedDocument::Live {
                file: self.file.clone(),
                text: self.extracted_text.clone(),
                summary: self.summary.clone(),
                analysis: self.analysis.clone(),
            }
        } else {
            DisplayedDocument::Empty
        };

        let visible = self.history.visible();
        let history = HistoryView {
            rows: visible
                .iter()
                .map(|doc| HistoryRowView {
                    id: doc.id,
                    filename: doc.filename.clone(),
                    summary_type: doc.summary_type.clone(),
                    word_count: doc.word_count,
                    created_at: doc.created_at.clone(),
                    selected: Some(doc.id) == selected_id,
                })
                .collect(),
            query: self.history.query.clone(),
            no_documents_found: visible.is_empty(),
            refresh_trigger: self.history.refresh_trigger,
            stats: self.history.stats.clone(),
        };

        AppViewModel {
            phase: self.phase,
            progress: self.progress,
            is_loading: self.phase.is_busy(),
            document,
            last_error: self.last_error.clone(),
            history,
            backend_online: self.backend_online,
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether state changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn next_request(&mut self) -> RequestId {
        self.last_request += 1;
        self.last_request
    }

    pub(crate) fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
        self.mark_dirty();
    }

    pub(crate) fn clear_live_document(&mut self) {
        self.file = None;
        self.extracted_text.clear();
        self.summary = None;
        self.analysis = None;
    }

    pub(crate) fn bump_refresh_trigger(&mut self) -> u64 {
        self.history.refresh_trigger += 1;
        self.mark_dirty();
        self.history.refresh_trigger
    }

    pub(crate) fn save_payload(&self) -> Option<SaveRequest> {
        let file = self.file.as_ref()?;
        if self.extracted_text.trim().is_empty() {
            return None;
        }
        let (summary, summary_type, summary_length) = match &self.summary {
            Some(summary) => (
                summary.text.clone(),
                summary.summary_type.wire_name(),
                summary.length.as_str(),
            ),
            None => (
                String::new(),
                SummaryType::Standard.wire_name(),
                SummaryLength::Medium.as_str(),
            ),
        };
        Some(SaveRequest {
            filename: file.name.clone(),
            text: self.extracted_text.clone(),
            summary,
            summary_type: summary_type.to_string(),
            summary_length: summary_length.to_string(),
            analysis: self.analysis.clone(),
            file_size: file.size,
        })
    }
}
