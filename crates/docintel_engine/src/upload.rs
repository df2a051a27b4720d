use std::fmt;
use std::io;
use std::path::Path;

use docintel_core::{is_accepted_mime, SelectedFile};
use reqwest::multipart::{Form, Part};

use crate::client::too_large;
use crate::{ApiError, FailureKind};

/// Name of the multipart field the backend reads the document from.
pub const UPLOAD_FIELD: &str = "file";

/// A document ready to be posted to `/upload`.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Reads `path` and infers the MIME type from its extension.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self {
            mime: mime_for_path(path).to_string(),
            name,
            bytes,
        })
    }

    pub(crate) fn check(&self, max_bytes: u64) -> Result<(), ApiError> {
        if !is_accepted_mime(&self.mime) {
            return Err(ApiError::new(
                FailureKind::UnsupportedContentType {
                    content_type: self.mime.clone(),
                },
                format!(
                    "Unsupported file type {:?}. Please upload a PDF, PNG, or JPEG file.",
                    self.mime
                ),
            ));
        }
        let size = self.bytes.len() as u64;
        if size > max_bytes {
            return Err(too_large(max_bytes, Some(size)));
        }
        Ok(())
    }

    pub(crate) fn into_form(self) -> Result<Form, ApiError> {
        let part = Part::bytes(self.bytes)
            .file_name(self.name)
            .mime_str(&self.mime)
            .map_err(|err| {
                ApiError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: self.mime.clone(),
                    },
                    err.to_string(),
                )
            })?;
        Ok(Form::new().part(UPLOAD_FIELD, part))
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl From<SelectedFile> for UploadFile {
    fn from(file: SelectedFile) -> Self {
        Self {
            name: file.name,
            mime: file.mime,
            bytes: file.bytes,
        }
    }
}

impl From<UploadFile> for SelectedFile {
    fn from(file: UploadFile) -> Self {
        SelectedFile::new(file.name, file.mime, file.bytes)
    }
}

/// MIME type for a file name. Unknown extensions map to
/// `application/octet-stream`, which the backend does not accept.
pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
