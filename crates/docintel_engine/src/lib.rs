//! Docintel engine: backend API client and effect execution.
mod api;
mod client;
mod engine;
mod export;
mod filename;
mod persist;
mod types;
mod upload;

pub use api::{DocumentApi, ReqwestApi};
pub use client::{ApiSettings, DEFAULT_API_BASE_URL};
pub use engine::{EngineConfig, EngineError, EngineHandle, Job, PhasePacing};
pub use export::{export_document, ExportError};
pub use filename::export_filename;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{ApiError, EngineEvent, FailureKind};
pub use upload::{mime_for_path, UploadFile, UPLOAD_FIELD};
