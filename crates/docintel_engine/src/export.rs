use std::path::PathBuf;

use docintel_core::ExportFormat;
use docintel_logging::docintel_info;

use crate::api::DocumentApi;
use crate::filename::export_filename;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::{ApiError, FailureKind};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("could not write export: {0}")]
    Persist(#[from] PersistError),
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Api(err) => err,
            ExportError::Persist(err) => ApiError::new(FailureKind::Io, err.to_string()),
        }
    }
}

/// Has the backend render `content` as `format` and stores the result as
/// `{title}.{extension}` in the writer's directory.
pub async fn export_document(
    api: &dyn DocumentApi,
    writer: &AtomicFileWriter,
    content: &str,
    format: ExportFormat,
    title: &str,
) -> Result<PathBuf, ExportError> {
    let body = api.export(content, format, title).await?;
    let filename = export_filename(title, format.extension());
    let path = writer.write(&filename, &body)?;
    docintel_info!(
        "Exported {} bytes as {} to {}",
        body.len(),
        format,
        path.display()
    );
    Ok(path)
}
