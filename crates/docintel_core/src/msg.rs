use crate::model::{
    Analysis, DocumentId, DocumentRecord, DocumentStats, ExportFormat, SelectedFile,
    SummaryLength, SummaryType,
};
use crate::{Preferences, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked a file to process.
    FileSelected(SelectedFile),
    /// User asked for a (re-)summary of the live text.
    SummarizeClicked {
        summary_type: SummaryType,
        length: SummaryLength,
    },
    /// User asked for a (re-)analysis of the live text.
    AnalyzeClicked,
    ExportClicked(ExportFormat),
    ResetClicked,
    CancelClicked,
    /// User closed the error banner.
    ErrorDismissed,
    PreferencesChanged(Preferences),
    HistoryRefreshRequested,
    HistoryQueryChanged(String),
    HistoryDocumentOpened(DocumentId),
    HistoryDeleteClicked(DocumentId),
    HistorySelectionCleared,
    /// Engine held a settle-only phase for its minimum visible duration.
    StepSettled { request: RequestId },
    UploadDone {
        request: RequestId,
        result: Result<String, String>,
    },
    SummaryDone {
        request: RequestId,
        result: Result<String, String>,
    },
    AnalysisDone {
        request: RequestId,
        result: Result<Analysis, String>,
    },
    SaveDone {
        request: RequestId,
        result: Result<Option<DocumentId>, String>,
    },
    ExportDone {
        format: ExportFormat,
        /// Path of the written file on success.
        result: Result<String, String>,
    },
    HistoryLoaded {
        trigger: u64,
        result: Result<Vec<DocumentRecord>, String>,
    },
    SearchResults {
        query: String,
        result: Result<Vec<DocumentRecord>, String>,
    },
    DocumentLoaded {
        id: DocumentId,
        result: Result<DocumentRecord, String>,
    },
    DocumentDeleted {
        id: DocumentId,
        result: Result<(), String>,
    },
    StatsLoaded(Result<DocumentStats, String>),
    HealthChecked(Result<(), String>),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
