use docintel_logging::{docintel_debug, docintel_info, docintel_warn};

use crate::model::{
    is_accepted_mime, Analysis, DocumentId, DocumentRecord, ExportFormat, FileInfo, SelectedFile,
    Summary, SummaryLength, SummaryType,
};
use crate::state::{Action, Pipeline, Step};
use crate::{AppState, Effect, Msg, NoticeLevel, Phase, RequestId};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected(file) => start_processing(&mut state, file),
        Msg::SummarizeClicked {
            summary_type,
            length,
        } => start_summarize(&mut state, summary_type, length),
        Msg::AnalyzeClicked => start_analyze(&mut state),
        Msg::ExportClicked(format) => request_export(&mut state, format),
        Msg::ResetClicked => {
            reset(&mut state);
            Vec::new()
        }
        Msg::CancelClicked => cancel(&mut state),
        Msg::ErrorDismissed => {
            if state.last_error.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PreferencesChanged(preferences) => {
            state.preferences = preferences;
            state.mark_dirty();
            Vec::new()
        }
        Msg::HistoryRefreshRequested => refresh_history(&mut state),
        Msg::HistoryQueryChanged(query) => change_query(&mut state, &query),
        Msg::HistoryDocumentOpened(id) => vec![Effect::FetchDocument { id }],
        Msg::HistoryDeleteClicked(id) => vec![Effect::DeleteDocument { id }],
        Msg::HistorySelectionCleared => {
            if state.history.selected.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::StepSettled { request } => {
            on_step_result(&mut state, request, Step::Extract, Ok(StepOutput::Settled))
        }
        Msg::UploadDone { request, result } => on_step_result(
            &mut state,
            request,
            Step::Upload,
            result.map(StepOutput::Uploaded),
        ),
        Msg::SummaryDone { request, result } => on_step_result(
            &mut state,
            request,
            Step::Summarize,
            result.map(StepOutput::Summarized),
        ),
        Msg::AnalysisDone { request, result } => on_step_result(
            &mut state,
            request,
            Step::Analyze,
            result.map(StepOutput::Analyzed),
        ),
        Msg::SaveDone { request, result } => {
            on_step_result(&mut state, request, Step::Save, result.map(StepOutput::Saved))
        }
        Msg::ExportDone { format, result } => {
            match result {
                Ok(path) => state.notify(
                    NoticeLevel::Success,
                    format!(
                        "Document exported as {} to {}",
                        format.as_str().to_uppercase(),
                        path
                    ),
                ),
                Err(err) => {
                    docintel_warn!("Export as {} failed: {}", format, err);
                    state.notify(NoticeLevel::Error, format!("Export failed: {err}"));
                }
            }
            Vec::new()
        }
        Msg::HistoryLoaded { trigger, result } => history_loaded(&mut state, trigger, result),
        Msg::SearchResults { query, result } => {
            if query != state.history.query {
                docintel_debug!("Dropping results for superseded query {:?}", query);
            } else {
                let results = result.unwrap_or_else(|err| {
                    docintel_warn!("Search for {:?} failed: {}", query, err);
                    Vec::new()
                });
                state.history.search_results = Some(results);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DocumentLoaded { id, result } => {
            match result {
                Ok(document) => {
                    state.history.selected = Some(document);
                    state.mark_dirty();
                }
                Err(err) => state.notify(
                    NoticeLevel::Error,
                    format!("Failed to load document {id}: {err}"),
                ),
            }
            Vec::new()
        }
        Msg::DocumentDeleted { id, result } => document_deleted(&mut state, id, result),
        Msg::StatsLoaded(result) => {
            match result {
                Ok(stats) => {
                    state.history.stats = Some(stats);
                    state.mark_dirty();
                }
                Err(err) => docintel_warn!("Failed to fetch stats: {}", err),
            }
            Vec::new()
        }
        Msg::HealthChecked(result) => {
            match result {
                Ok(()) => state.backend_online = Some(true),
                Err(err) => {
                    docintel_warn!("Health check failed: {}", err);
                    state.backend_online = Some(false);
                    state.notify(
                        NoticeLevel::Error,
                        "Backend connection failed. Some features may not work.",
                    );
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Export title for the current file: `<stem>_summary`, or a generic title.
pub fn export_title(file: Option<&FileInfo>) -> String {
    match file {
        Some(file) if !file.stem().is_empty() => format!("{}_summary", file.stem()),
        _ => "Document Summary".to_string(),
    }
}

enum StepOutput {
    Settled,
    Uploaded(String),
    Summarized(String),
    Analyzed(Analysis),
    Saved(Option<DocumentId>),
}

fn begin_action(state: &mut AppState, action: Action) -> bool {
    if !state.phase.accepts_action() {
        docintel_debug!("Ignoring {:?} while {}", action, state.phase.as_str());
        state.notify(
            NoticeLevel::Info,
            "Please wait for the current operation to finish",
        );
        return false;
    }
    if state.phase == Phase::Error {
        state.phase = Phase::Idle;
        state.last_error = None;
    }
    true
}

fn start_processing(state: &mut AppState, file: SelectedFile) -> Vec<Effect> {
    if !is_accepted_mime(&file.mime) {
        docintel_warn!("Rejected {} with unsupported type {:?}", file.name, file.mime);
        state.notify(
            NoticeLevel::Error,
            format!(
                "Unsupported file type {:?}. Please upload a PDF, PNG, or JPEG file.",
                file.mime
            ),
        );
        return Vec::new();
    }
    if !begin_action(state, Action::Process) {
        return Vec::new();
    }

    docintel_info!("Processing {} ({} bytes)", file.name, file.bytes.len());
    state.history.selected = None;
    state.clear_live_document();
    state.file = Some(file.info());

    let preferences = &state.preferences;
    let mut steps = vec![Step::Upload, Step::Extract];
    if preferences.auto_summarize {
        steps.push(Step::Summarize);
    }
    if preferences.auto_analyze {
        steps.push(Step::Analyze);
    }
    if preferences.auto_save {
        steps.push(Step::Save);
    }

    let mut pipeline = Pipeline::new(
        Action::Process,
        steps,
        preferences.summary_type,
        preferences.length,
    );
    pipeline.upload = Some(file);
    start_pipeline(state, pipeline)
}

fn start_summarize(
    state: &mut AppState,
    summary_type: SummaryType,
    length: SummaryLength,
) -> Vec<Effect> {
    if !begin_action(state, Action::Summarize) {
        return Vec::new();
    }
    if state.extracted_text.trim().is_empty() {
        state.notify(NoticeLevel::Error, "No text available to summarize");
        return Vec::new();
    }

    let mut steps = vec![Step::Summarize];
    if state.preferences.analyze_after_summarize {
        steps.push(Step::Analyze);
    }
    if state.file.is_some() {
        steps.push(Step::Save);
    }
    start_pipeline(
        state,
        Pipeline::new(Action::Summarize, steps, summary_type, length),
    )
}

fn start_analyze(state: &mut AppState) -> Vec<Effect> {
    if !begin_action(state, Action::Analyze) {
        return Vec::new();
    }
    if state.extracted_text.trim().is_empty() {
        state.notify(NoticeLevel::Error, "No text available to analyze");
        return Vec::new();
    }

    let preferences = &state.preferences;
    let pipeline = Pipeline::new(
        Action::Analyze,
        vec![Step::Analyze],
        preferences.summary_type,
        preferences.length,
    );
    start_pipeline(state, pipeline)
}

fn start_pipeline(state: &mut AppState, pipeline: Pipeline) -> Vec<Effect> {
    state.progress = 0;
    state.pipeline = Some(pipeline);
    state.mark_dirty();
    advance(state)
}

/// Issues the next step's effect, skipping steps with nothing to send, and
/// finishes the action once no steps remain.
fn advance(state: &mut AppState) -> Vec<Effect> {
    while let Some(step) = next_step(state) {
        if let Some(effect) = effect_for(state, step) {
            return vec![effect];
        }
        docintel_debug!("Nothing to send for {:?}; skipping", step);
        complete_current(state, true);
    }
    finish(state)
}

fn next_step(state: &mut AppState) -> Option<Step> {
    let pipeline = state.pipeline.as_mut()?;
    let step = pipeline.remaining.pop_front()?;
    pipeline.current = Some(step);
    let progress = pipeline.progress();

    if let Some(phase) = step.phase() {
        state.phase = phase;
    }
    state.progress = state.progress.max(progress);
    state.mark_dirty();
    Some(step)
}

fn effect_for(state: &mut AppState, step: Step) -> Option<Effect> {
    let request = state.next_request();
    let pipeline = state.pipeline.as_mut()?;
    pipeline.request = request;

    match step {
        Step::Upload => pipeline
            .upload
            .take()
            .map(|file| Effect::Upload { request, file }),
        Step::Extract => Some(Effect::Settle {
            request,
            phase: Phase::Extracting,
        }),
        Step::Summarize => {
            let (summary_type, length) = (pipeline.summary_type, pipeline.length);
            live_text(state).map(|text| Effect::Summarize {
                request,
                text,
                summary_type,
                length,
            })
        }
        Step::Analyze => live_text(state).map(|text| Effect::Analyze { request, text }),
        Step::Save => state
            .save_payload()
            .map(|payload| Effect::Save { request, payload }),
    }
}

fn live_text(state: &AppState) -> Option<String> {
    if state.extracted_text.trim().is_empty() {
        None
    } else {
        Some(state.extracted_text.clone())
    }
}

fn complete_current(state: &mut AppState, skipped: bool) {
    if let Some(pipeline) = state.pipeline.as_mut() {
        if let Some(step) = pipeline.current.take() {
            pipeline.completed += 1;
            if skipped {
                pipeline.skipped.push(step);
            }
        }
    }
}

fn on_step_result(
    state: &mut AppState,
    request: RequestId,
    step: Step,
    result: Result<StepOutput, String>,
) -> Vec<Effect> {
    let action = match state.pipeline.as_ref() {
        Some(pipeline) if pipeline.request == request && pipeline.current == Some(step) => {
            pipeline.action
        }
        _ => {
            docintel_debug!("Dropping stale {:?} result for request {}", step, request);
            return Vec::new();
        }
    };

    let mut effects = Vec::new();
    match result {
        Ok(output) => {
            effects.extend(apply_output(state, output));
            complete_current(state, false);
        }
        Err(message) if step.is_critical_for(action) => {
            fail_action(state, action, &message);
            return Vec::new();
        }
        Err(message) => {
            docintel_warn!("{:?} step failed, continuing without it: {}", step, message);
            if step == Step::Save && state.preferences.local_mirror {
                if let Some(payload) = state.save_payload() {
                    effects.push(Effect::MirrorLocally(payload));
                    state.notify(
                        NoticeLevel::Info,
                        "Backend save failed; document saved locally",
                    );
                }
            }
            complete_current(state, true);
        }
    }

    effects.extend(advance(state));
    effects
}

fn apply_output(state: &mut AppState, output: StepOutput) -> Vec<Effect> {
    let Some(pipeline) = state.pipeline.as_mut() else {
        return Vec::new();
    };

    match output {
        StepOutput::Uploaded(text) => {
            pipeline.uploaded_text = Some(text);
            Vec::new()
        }
        StepOutput::Settled => {
            state.extracted_text = pipeline.uploaded_text.take().unwrap_or_default();
            state.mark_dirty();
            Vec::new()
        }
        StepOutput::Summarized(text) => {
            state.summary = Some(Summary {
                text,
                summary_type: pipeline.summary_type,
                length: pipeline.length,
            });
            state.mark_dirty();
            Vec::new()
        }
        StepOutput::Analyzed(analysis) => {
            state.analysis = Some(analysis);
            state.mark_dirty();
            Vec::new()
        }
        StepOutput::Saved(document_id) => {
            pipeline.saved = true;
            docintel_info!("Document saved with id {:?}", document_id);
            refresh_history(state)
        }
    }
}

fn finish(state: &mut AppState) -> Vec<Effect> {
    let Some(pipeline) = state.pipeline.take() else {
        return Vec::new();
    };
    state.phase = Phase::Ready;
    state.progress = 100;

    let message = match pipeline.action {
        Action::Process
            if pipeline.saved
                && pipeline.succeeded(Step::Summarize)
                && pipeline.succeeded(Step::Analyze) =>
        {
            "Document processed, summarized, and saved automatically!"
        }
        Action::Process => "Document processed successfully!",
        Action::Summarize if pipeline.succeeded(Step::Analyze) => {
            "Summary and analytics generated successfully!"
        }
        Action::Summarize => "Summary generated successfully!",
        Action::Analyze => "Analysis completed!",
    };
    if !pipeline.skipped.is_empty() {
        docintel_info!("{:?} finished; skipped steps {:?}", pipeline.action, pipeline.skipped);
    }
    state.notify(NoticeLevel::Success, message);
    Vec::new()
}

fn fail_action(state: &mut AppState, action: Action, message: &str) {
    let text = format!("{}: {}", action.failure_prefix(), message);
    docintel_warn!("{}", text);
    state.pipeline = None;
    state.phase = Phase::Error;
    state.last_error = Some(text.clone());
    state.notify(NoticeLevel::Error, text);
}

fn cancel(state: &mut AppState) -> Vec<Effect> {
    let Some(request) = state.in_flight() else {
        return Vec::new();
    };
    let Some(action) = state.pipeline.as_ref().map(|pipeline| pipeline.action) else {
        return Vec::new();
    };
    fail_action(state, action, "cancelled");
    vec![Effect::Cancel { request }]
}

fn reset(state: &mut AppState) {
    if state.phase.is_busy() {
        state.notify(NoticeLevel::Info, "Cannot reset while processing");
        return;
    }
    state.phase = Phase::Idle;
    state.progress = 0;
    state.clear_live_document();
    state.history.selected = None;
    state.last_error = None;
    state.mark_dirty();
}

fn request_export(state: &mut AppState, format: ExportFormat) -> Vec<Effect> {
    let summary = state
        .summary
        .as_ref()
        .map(|summary| summary.text.as_str())
        .filter(|text| !text.trim().is_empty());
    let content = summary.or_else(|| {
        Some(state.extracted_text.as_str()).filter(|text| !text.trim().is_empty())
    });
    let Some(content) = content.map(ToOwned::to_owned) else {
        state.notify(NoticeLevel::Error, "No content to export");
        return Vec::new();
    };

    vec![Effect::Export {
        content,
        format,
        title: export_title(state.file.as_ref()),
    }]
}

fn refresh_history(state: &mut AppState) -> Vec<Effect> {
    let trigger = state.bump_refresh_trigger();
    vec![Effect::LoadHistory { trigger }, Effect::LoadStats]
}

fn history_loaded(
    state: &mut AppState,
    trigger: u64,
    result: Result<Vec<DocumentRecord>, String>,
) -> Vec<Effect> {
    if trigger != state.history.refresh_trigger {
        docintel_debug!(
            "Dropping history for stale trigger {} (current {})",
            trigger,
            state.history.refresh_trigger
        );
        return Vec::new();
    }
    match result {
        Ok(documents) => {
            state.history.set_entries(documents);
            state.mark_dirty();
            // An active filter is re-run against the reloaded entries.
            if state.history.query.is_empty() {
                Vec::new()
            } else {
                vec![Effect::SearchHistory {
                    query: state.history.query.clone(),
                }]
            }
        }
        Err(err) => {
            docintel_warn!("Failed to fetch documents: {}", err);
            Vec::new()
        }
    }
}

fn change_query(state: &mut AppState, query: &str) -> Vec<Effect> {
    let query = query.trim();
    if query.is_empty() {
        let had_search =
            !state.history.query.is_empty() || state.history.search_results.is_some();
        state.history.query.clear();
        state.history.search_results = None;
        if had_search {
            state.mark_dirty();
        }
        return Vec::new();
    }

    state.history.query = query.to_string();
    state.mark_dirty();
    vec![Effect::SearchHistory {
        query: query.to_string(),
    }]
}

fn document_deleted(
    state: &mut AppState,
    id: DocumentId,
    result: Result<(), String>,
) -> Vec<Effect> {
    match result {
        Ok(()) => {
            state.history.remove(id);
            state.notify(NoticeLevel::Success, "Document deleted");
            vec![Effect::LoadStats]
        }
        Err(err) => {
            state.notify(
                NoticeLevel::Error,
                format!("Failed to delete document {id}: {err}"),
            );
            Vec::new()
        }
    }
}
