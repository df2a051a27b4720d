use std::fmt;
use std::path::PathBuf;

use docintel_core::{Analysis, DocumentId, DocumentRecord, DocumentStats, ExportFormat, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    HealthChecked(Result<(), ApiError>),
    /// A settle-only phase has been visible long enough.
    Settled { request: RequestId },
    Uploaded {
        request: RequestId,
        result: Result<String, ApiError>,
    },
    Summarized {
        request: RequestId,
        result: Result<String, ApiError>,
    },
    Analyzed {
        request: RequestId,
        result: Result<Analysis, ApiError>,
    },
    Saved {
        request: RequestId,
        result: Result<Option<DocumentId>, ApiError>,
    },
    Exported {
        format: ExportFormat,
        result: Result<PathBuf, ApiError>,
    },
    HistoryLoaded {
        trigger: u64,
        result: Result<Vec<DocumentRecord>, ApiError>,
    },
    SearchCompleted {
        query: String,
        result: Result<Vec<DocumentRecord>, ApiError>,
    },
    DocumentLoaded {
        id: DocumentId,
        result: Result<DocumentRecord, ApiError>,
    },
    DocumentDeleted {
        id: DocumentId,
        result: Result<(), ApiError>,
    },
    StatsLoaded(Result<DocumentStats, ApiError>),
}

/// Failure of a backend call. `message` is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "cancelled")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Cancelled,
    Decode,
    Io,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "payload too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
