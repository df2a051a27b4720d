use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use docintel_core::{
    update, AppState, AppViewModel, DisplayedDocument, DocumentId, Effect, ExportFormat, Msg,
    Phase, Preferences, SelectedFile, SummaryLength, SummaryType,
};
use docintel_engine::{EngineHandle, UploadFile};
use docintel_logging::docintel_debug;

use super::effects::EffectRunner;
use super::ui::render;
use crate::cli::Settings;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One state container driven by user messages and engine completions.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    base_url: String,
    last_status: Option<(Phase, u8)>,
}

impl Session {
    pub fn new(settings: &Settings) -> Result<Self> {
        let engine = EngineHandle::new(settings.engine_config())
            .context("failed to start the request engine")?;
        Ok(Self {
            state: AppState::with_preferences(settings.preferences()),
            runner: EffectRunner::new(engine, settings.data_dir.clone()),
            base_url: settings.base_url(),
            last_status: None,
        })
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn preferences(&self) -> Preferences {
        self.state.preferences().clone()
    }

    /// Applies `msg`, submits its effects and waits until every job has
    /// reported back.
    pub fn dispatch(&mut self, msg: Msg) {
        self.apply(msg);
        while self.runner.pending() > 0 {
            if let Some(msg) = self.runner.next_msg(POLL_INTERVAL) {
                self.apply(msg);
            }
        }
    }

    fn apply(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        if !effects.is_empty() {
            docintel_debug!("update produced {} effect(s)", effects.len());
        }
        self.runner.enqueue(effects);
        self.flush();
    }

    fn flush(&mut self) {
        if !self.state.consume_dirty() {
            return;
        }
        for notice in self.state.take_notices() {
            println!("{}", render::render_notice(&notice));
        }
        let view = self.state.view();
        let status = (view.phase, view.progress);
        if view.is_loading && self.last_status != Some(status) {
            println!("{}", render::status_line(&view));
        }
        self.last_status = Some(status);
    }

    /// Probes the backend. Failure is reported but not fatal.
    pub fn check_health(&mut self) -> bool {
        self.runner.enqueue(vec![Effect::CheckHealth]);
        while self.runner.pending() > 0 {
            if let Some(msg) = self.runner.next_msg(POLL_INTERVAL) {
                self.apply(msg);
            }
        }
        self.state.view().backend_online == Some(true)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload(&mut self, path: &Path) -> Result<()> {
        let file = read_file(path)?;
        self.dispatch(Msg::FileSelected(file));
        self.ensure_ok()?;
        if self.state.view().document == DisplayedDocument::Empty {
            return Err(anyhow!("{} was not processed", path.display()));
        }
        Ok(())
    }

    pub fn summarize(&mut self, summary_type: SummaryType, length: SummaryLength) -> Result<()> {
        self.dispatch(Msg::SummarizeClicked {
            summary_type,
            length,
        });
        self.ensure_ok()
    }

    pub fn analyze(&mut self) -> Result<()> {
        self.dispatch(Msg::AnalyzeClicked);
        self.ensure_ok()
    }

    pub fn export(&mut self, format: ExportFormat) {
        self.dispatch(Msg::ExportClicked(format));
    }

    pub fn refresh_history(&mut self) {
        self.dispatch(Msg::HistoryRefreshRequested);
    }

    pub fn search(&mut self, query: &str) {
        self.dispatch(Msg::HistoryQueryChanged(query.to_string()));
    }

    pub fn open(&mut self, id: DocumentId) {
        self.dispatch(Msg::HistoryDocumentOpened(id));
    }

    pub fn delete(&mut self, id: DocumentId) {
        self.dispatch(Msg::HistoryDeleteClicked(id));
    }

    pub fn close_selection(&mut self) {
        self.dispatch(Msg::HistorySelectionCleared);
    }

    pub fn reset(&mut self) {
        self.dispatch(Msg::ResetClicked);
    }

    pub fn dismiss_error(&mut self) {
        self.dispatch(Msg::ErrorDismissed);
    }

    pub fn print_document(&self) {
        print_lines(render::render_document(&self.view()));
    }

    pub fn print_history(&self) {
        print_lines(render::render_history(&self.view().history));
    }

    pub fn print_stats(&self) {
        match &self.view().history.stats {
            Some(stats) => print_lines(render::render_stats(stats)),
            None => println!("No statistics available."),
        }
    }

    pub fn print_status(&self) {
        println!("{}", render::status_line(&self.view()));
    }

    fn ensure_ok(&self) -> Result<()> {
        if self.state.phase() == Phase::Error {
            let view = self.state.view();
            return Err(anyhow!(view
                .last_error
                .unwrap_or_else(|| "operation failed".to_string())));
        }
        Ok(())
    }
}

/// Reads `path` as the file to upload.
pub fn read_file(path: &Path) -> Result<SelectedFile> {
    let file = UploadFile::from_path(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(file.into())
}

pub fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
