use std::path::PathBuf;
use std::time::Duration;

use docintel_core::{Effect, Msg};
use docintel_engine::{EngineEvent, EngineHandle, Job};
use docintel_logging::{docintel_info, docintel_warn};

use super::persistence::append_local_save;

/// Hands core effects to the engine and turns engine events back into
/// messages.
pub struct EffectRunner {
    engine: EngineHandle,
    data_dir: PathBuf,
    pending: usize,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, data_dir: PathBuf) -> Self {
        Self {
            engine,
            data_dir,
            pending: 0,
        }
    }

    /// Number of submitted jobs that have not reported back yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Cancel { request } => {
                    docintel_info!("Cancel request={}", request);
                    self.engine.cancel(request);
                }
                Effect::MirrorLocally(payload) => {
                    let filename = payload.filename.clone();
                    match append_local_save(&self.data_dir, payload) {
                        Ok(()) => docintel_info!("Mirrored {} locally", filename),
                        Err(err) => docintel_warn!("Local mirror of {} failed: {}", filename, err),
                    }
                }
                other => {
                    if let Some(job) = job_for(other) {
                        docintel_info!("Submit {}", describe(&job));
                        self.pending += 1;
                        self.engine.submit(job);
                    }
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        self.pending = self.pending.saturating_sub(1);
        Some(map_event(event))
    }
}

fn job_for(effect: Effect) -> Option<Job> {
    let job = match effect {
        Effect::CheckHealth => Job::Health,
        Effect::Upload { request, file } => Job::Upload {
            request,
            file: file.into(),
        },
        Effect::Settle { request, .. } => Job::Settle { request },
        Effect::Summarize {
            request,
            text,
            summary_type,
            length,
        } => Job::Summarize {
            request,
            text,
            summary_type,
            length,
        },
        Effect::Analyze { request, text } => Job::Analyze { request, text },
        Effect::Save { request, payload } => Job::Save { request, payload },
        Effect::Export {
            content,
            format,
            title,
        } => Job::Export {
            content,
            format,
            title,
        },
        Effect::LoadHistory { trigger } => Job::ListDocuments { trigger },
        Effect::LoadStats => Job::Stats,
        Effect::SearchHistory { query } => Job::Search { query },
        Effect::FetchDocument { id } => Job::GetDocument { id },
        Effect::DeleteDocument { id } => Job::DeleteDocument { id },
        Effect::Cancel { .. } | Effect::MirrorLocally(_) => return None,
    };
    Some(job)
}

fn describe(job: &Job) -> String {
    match job {
        Job::Upload { request, file } => {
            format!("upload request={} file={:?}", request, file)
        }
        Job::Summarize {
            request,
            text,
            summary_type,
            length,
        } => format!(
            "summarize request={} type={} length={} text_len={}",
            request,
            summary_type,
            length,
            text.len()
        ),
        Job::Analyze { request, text } => {
            format!("analyze request={} text_len={}", request, text.len())
        }
        Job::Save { request, payload } => {
            format!("save request={} filename={}", request, payload.filename)
        }
        other => format!("{other:?}"),
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::HealthChecked(result) => Msg::HealthChecked(result.map_err(|e| e.message)),
        EngineEvent::Settled { request } => Msg::StepSettled { request },
        EngineEvent::Uploaded { request, result } => Msg::UploadDone {
            request,
            result: result.map_err(|e| e.message),
        },
        EngineEvent::Summarized { request, result } => Msg::SummaryDone {
            request,
            result: result.map_err(|e| e.message),
        },
        EngineEvent::Analyzed { request, result } => Msg::AnalysisDone {
            request,
            result: result.map_err(|e| e.message),
        },
        EngineEvent::Saved { request, result } => Msg::SaveDone {
            request,
            result: result.map_err(|e| e.message),
        },
        EngineEvent::Exported { format, result } => Msg::ExportDone {
            format,
            result: result
                .map(|path| path.display().to_string())
                .map_err(|e| e.message),
        },
        EngineEvent::HistoryLoaded { trigger, result } => Msg::HistoryLoaded {
            trigger,
            result: result.map_err(|e| e.message),
        },
        EngineEvent::SearchCompleted { query, result } => Msg::SearchResults {
            query,
            result: result.map_err(|e| e.message),
        },
        EngineEvent::DocumentLoaded { id, result } => Msg::DocumentLoaded {
            id,
            result: result.map_err(|e| e.message),
        },
        EngineEvent::DocumentDeleted { id, result } => Msg::DocumentDeleted {
            id,
            result: result.map_err(|e| e.message),
        },
        EngineEvent::StatsLoaded(result) => Msg::StatsLoaded(result.map_err(|e| e.message)),
    }
}
