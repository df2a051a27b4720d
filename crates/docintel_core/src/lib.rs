//! Docintel core: pure processing state machine, data model and view-model helpers.
pub mod model;

mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use model::{
    is_accepted_mime, Analysis, DocumentId, DocumentRecord, DocumentStats, ExportFormat, FileInfo,
    SaveRequest, SelectedFile, Summary, SummaryLength, SummaryRoute, SummaryType,
    ACCEPTED_MIME_TYPES,
};
pub use msg::Msg;
pub use state::{
    Action, AppState, Notice, NoticeLevel, Phase, Preferences, RequestId, Step, HISTORY_WINDOW,
};
pub use update::{export_title, update};
pub use view_model::{AppViewModel, DisplayedDocument, HistoryRowView, HistoryView};
