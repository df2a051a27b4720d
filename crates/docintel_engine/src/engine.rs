use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use docintel_core::{DocumentId, ExportFormat, RequestId, SaveRequest, SummaryLength, SummaryType};
use docintel_logging::{docintel_debug, docintel_info, docintel_warn};
use tokio_util::sync::CancellationToken;

use crate::api::{DocumentApi, ReqwestApi};
use crate::client::ApiSettings;
use crate::export::export_document;
use crate::persist::AtomicFileWriter;
use crate::upload::UploadFile;
use crate::{ApiError, EngineEvent};

/// Minimum time a pipeline phase stays visible before its request goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasePacing {
    pub min_visible: Duration,
}

impl PhasePacing {
    pub fn disabled() -> Self {
        Self {
            min_visible: Duration::ZERO,
        }
    }

    async fn hold(&self) {
        if self.min_visible.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.min_visible).await;
        }
    }
}

impl Default for PhasePacing {
    fn default() -> Self {
        Self {
            min_visible: Duration::from_millis(400),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api: ApiSettings,
    pub pacing: PhasePacing,
    /// Where exported files are written.
    pub download_dir: PathBuf,
}

impl EngineConfig {
    pub fn default_with_download_dir(download_dir: PathBuf) -> Self {
        Self {
            api: ApiSettings::default(),
            pacing: PhasePacing::default(),
            download_dir,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid api configuration: {0}")]
    Api(#[from] ApiError),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Work the engine can run. Every job reports exactly one `EngineEvent`.
/// Pipeline jobs carry the request id they report back with and can be
/// cancelled through it.
#[derive(Debug, Clone)]
pub enum Job {
    Health,
    Upload {
        request: RequestId,
        file: UploadFile,
    },
    /// Holds the current phase for the pacing delay, then reports `Settled`.
    Settle { request: RequestId },
    Summarize {
        request: RequestId,
        text: String,
        summary_type: SummaryType,
        length: SummaryLength,
    },
    Analyze { request: RequestId, text: String },
    Save {
        request: RequestId,
        payload: SaveRequest,
    },
    Export {
        content: String,
        format: ExportFormat,
        title: String,
    },
    ListDocuments { trigger: u64 },
    Stats,
    Search { query: String },
    GetDocument { id: DocumentId },
    DeleteDocument { id: DocumentId },
}

impl Job {
    pub fn request(&self) -> Option<RequestId> {
        match self {
            Job::Upload { request, .. }
            | Job::Settle { request }
            | Job::Summarize { request, .. }
            | Job::Analyze { request, .. }
            | Job::Save { request, .. } => Some(*request),
            _ => None,
        }
    }

    fn is_paced(&self) -> bool {
        matches!(
            self,
            Job::Upload { .. } | Job::Settle { .. } | Job::Summarize { .. } | Job::Analyze { .. }
        )
    }

    /// Event reported when the job is cancelled before it completes.
    fn cancelled_event(&self) -> Option<EngineEvent> {
        match self {
            Job::Settle { request } => Some(EngineEvent::Settled { request: *request }),
            Job::Upload { request, .. } => Some(EngineEvent::Uploaded {
                request: *request,
                result: Err(ApiError::cancelled()),
            }),
            Job::Summarize { request, .. } => Some(EngineEvent::Summarized {
                request: *request,
                result: Err(ApiError::cancelled()),
            }),
            Job::Analyze { request, .. } => Some(EngineEvent::Analyzed {
                request: *request,
                result: Err(ApiError::cancelled()),
            }),
            Job::Save { request, .. } => Some(EngineEvent::Saved {
                request: *request,
                result: Err(ApiError::cancelled()),
            }),
            _ => None,
        }
    }
}

enum EngineCommand {
    Submit(Job),
    Cancel { request: RequestId },
}

type TokenMap = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

struct Worker {
    api: Arc<dyn DocumentApi>,
    writer: AtomicFileWriter,
    pacing: PhasePacing,
    events: mpsc::Sender<EngineEvent>,
    tokens: TokenMap,
}

/// Runs jobs on a background tokio runtime and hands events back over a
/// channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let api = Arc::new(ReqwestApi::new(config.api)?);
        Self::with_api(api, config.pacing, config.download_dir)
    }

    pub fn with_api(
        api: Arc<dyn DocumentApi>,
        pacing: PhasePacing,
        download_dir: PathBuf,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("docintel-engine")
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let worker = Arc::new(Worker {
            api,
            writer: AtomicFileWriter::new(download_dir),
            pacing,
            events: event_tx,
            tokens: Arc::new(Mutex::new(HashMap::new())),
        });

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Submit(job) => {
                        let token = CancellationToken::new();
                        if let Some(request) = job.request() {
                            if let Ok(mut tokens) = worker.tokens.lock() {
                                tokens.insert(request, token.clone());
                            }
                        }
                        let worker = worker.clone();
                        runtime.spawn(async move {
                            run_job(worker, job, token).await;
                        });
                    }
                    EngineCommand::Cancel { request } => {
                        let token = worker
                            .tokens
                            .lock()
                            .ok()
                            .and_then(|mut tokens| tokens.remove(&request));
                        match token {
                            Some(token) => {
                                docintel_info!("Cancelling request {}", request);
                                token.cancel();
                            }
                            None => docintel_debug!("Request {} already finished", request),
                        }
                    }
                }
            }
            docintel_debug!("Engine command channel closed; shutting down");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, job: Job) {
        if self.cmd_tx.send(EngineCommand::Submit(job)).is_err() {
            docintel_warn!("Engine thread is gone; job dropped");
        }
    }

    /// Aborts the job for `request`. The job still reports exactly one event.
    ///
    /// Only reachable while a caller keeps polling between submit and
    /// completion. The `docintel` binary waits for each dispatch to finish,
    /// so it never cancels; its requests are bounded by the client timeouts.
    pub fn cancel(&self, request: RequestId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { request });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn run_job(worker: Arc<Worker>, job: Job, token: CancellationToken) {
    let request = job.request();
    let on_cancel = job.cancelled_event();

    let event = tokio::select! {
        biased;
        _ = token.cancelled() => on_cancel,
        event = execute(&worker, job) => Some(event),
    };

    if let Some(request) = request {
        if let Ok(mut tokens) = worker.tokens.lock() {
            tokens.remove(&request);
        }
    }
    if let Some(event) = event {
        let _ = worker.events.send(event);
    }
}

async fn execute(worker: &Worker, job: Job) -> EngineEvent {
    if job.is_paced() {
        worker.pacing.hold().await;
    }
    let api = worker.api.as_ref();

    match job {
        Job::Health => EngineEvent::HealthChecked(api.health().await),
        Job::Upload { request, file } => EngineEvent::Uploaded {
            request,
            result: api.upload(file).await,
        },
        Job::Settle { request } => EngineEvent::Settled { request },
        Job::Summarize {
            request,
            text,
            summary_type,
            length,
        } => EngineEvent::Summarized {
            request,
            result: api.summarize(&text, summary_type, length).await,
        },
        Job::Analyze { request, text } => EngineEvent::Analyzed {
            request,
            result: api.analyze(&text).await,
        },
        Job::Save { request, payload } => EngineEvent::Saved {
            request,
            result: api.save_document(&payload).await,
        },
        Job::Export {
            content,
            format,
            title,
        } => EngineEvent::Exported {
            format,
            result: export_document(api, &worker.writer, &content, format, &title)
                .await
                .map_err(ApiError::from),
        },
        Job::ListDocuments { trigger } => EngineEvent::HistoryLoaded {
            trigger,
            result: api.list_documents().await,
        },
        Job::Stats => EngineEvent::StatsLoaded(api.stats().await),
        Job::Search { query } => {
            let result = api.search_documents(&query).await;
            EngineEvent::SearchCompleted { query, result }
        }
        Job::GetDocument { id } => EngineEvent::DocumentLoaded {
            id,
            result: api.get_document(id).await,
        },
        Job::DeleteDocument { id } => EngineEvent::DocumentDeleted {
            id,
            result: api.delete_document(id).await,
        },
    }
}
