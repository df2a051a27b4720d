use crate::model::{Analysis, DocumentId, DocumentRecord, DocumentStats, FileInfo, Summary};
use crate::Phase;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: Phase,
    pub progress: u8,
    pub is_loading: bool,
    pub document: DisplayedDocument,
    pub last_error: Option<String>,
    pub history: HistoryView,
    pub backend_online: Option<bool>,
    pub dirty: bool,
}

/// The one document the UI shows. A historical selection wins over the live
/// document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DisplayedDocument {
    #[default]
    Empty,
    Live {
        file: Option<FileInfo>,
        text: String,
        summary: Option<Summary>,
        analysis: Option<Analysis>,
    },
    Historical(DocumentRecord),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryView {
    pub rows: Vec<HistoryRowView>,
    pub query: String,
    pub no_documents_found: bool,
    pub refresh_trigger: u64,
    pub stats: Option<DocumentStats>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub id: DocumentId,
    pub filename: String,
    pub summary_type: String,
    pub word_count: u64,
    pub created_at: String,
    pub selected: bool,
}
