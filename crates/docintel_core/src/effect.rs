use crate::model::{DocumentId, ExportFormat, SaveRequest, SelectedFile, SummaryLength, SummaryType};
use crate::{Phase, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CheckHealth,
    /// Post the file to `/upload`.
    Upload { request: RequestId, file: SelectedFile },
    /// Keep `phase` visible, then report `Msg::StepSettled`.
    Settle { request: RequestId, phase: Phase },
    Summarize {
        request: RequestId,
        text: String,
        summary_type: SummaryType,
        length: SummaryLength,
    },
    Analyze { request: RequestId, text: String },
    Save { request: RequestId, payload: SaveRequest },
    /// Abort the in-flight request.
    Cancel { request: RequestId },
    Export {
        content: String,
        format: ExportFormat,
        title: String,
    },
    LoadHistory { trigger: u64 },
    LoadStats,
    SearchHistory { query: String },
    FetchDocument { id: DocumentId },
    DeleteDocument { id: DocumentId },
    /// Best-effort local copy of a document the backend failed to save.
    MirrorLocally(SaveRequest),
}
