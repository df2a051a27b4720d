use bytes::Bytes;
use docintel_core::{
    Analysis, DocumentId, DocumentRecord, DocumentStats, ExportFormat, SaveRequest, SummaryLength,
    SummaryRoute, SummaryType,
};
use docintel_logging::docintel_debug;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::{decode_json, ensure_success, map_reqwest_error, ApiClient, ApiSettings};
use crate::upload::UploadFile;
use crate::ApiError;

/// One method per backend endpoint.
#[async_trait::async_trait]
pub trait DocumentApi: Send + Sync {
    async fn health(&self) -> Result<(), ApiError>;

    /// Uploads a document and returns its extracted text.
    async fn upload(&self, file: UploadFile) -> Result<String, ApiError>;

    async fn summarize(
        &self,
        text: &str,
        summary_type: SummaryType,
        length: SummaryLength,
    ) -> Result<String, ApiError>;

    async fn analyze(&self, text: &str) -> Result<Analysis, ApiError>;

    /// Renders `content` on the backend and returns the file body.
    async fn export(&self, content: &str, format: ExportFormat, title: &str)
        -> Result<Bytes, ApiError>;

    async fn save_document(&self, request: &SaveRequest) -> Result<Option<DocumentId>, ApiError>;

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ApiError>;

    async fn stats(&self) -> Result<DocumentStats, ApiError>;

    async fn search_documents(&self, query: &str) -> Result<Vec<DocumentRecord>, ApiError>;

    async fn get_document(&self, id: DocumentId) -> Result<DocumentRecord, ApiError>;

    async fn delete_document(&self, id: DocumentId) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct TextResponse {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    summary: String,
}

#[derive(Deserialize)]
struct DocumentsResponse {
    #[serde(default)]
    documents: Vec<DocumentRecord>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<DocumentRecord>,
}

#[derive(Deserialize)]
struct DocumentResponse {
    document: DocumentRecord,
}

#[derive(Deserialize)]
struct StatsResponse {
    #[serde(default)]
    stats: DocumentStats,
}

#[derive(Deserialize)]
struct SaveResponse {
    #[serde(default)]
    document_id: Option<DocumentId>,
}

#[derive(Serialize)]
struct TextBody<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct StandardSummaryBody<'a> {
    text: &'a str,
    #[serde(rename = "type")]
    summary_type: &'a str,
    length: &'a str,
}

#[derive(Serialize)]
struct FastSummaryBody<'a> {
    text: &'a str,
    length: &'a str,
}

#[derive(Serialize)]
struct AdvancedSummaryBody<'a> {
    text: &'a str,
    summary_type: &'a str,
    length: &'a str,
}

#[derive(Serialize)]
struct ExportBody<'a> {
    content: &'a str,
    format: &'a str,
    title: &'a str,
}

/// `DocumentApi` over HTTP.
#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: ApiClient,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        Ok(Self {
            client: ApiClient::new(settings)?,
        })
    }
}

#[async_trait::async_trait]
impl DocumentApi for ReqwestApi {
    async fn health(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self.client.get_json(&["health"]).await?;
        Ok(())
    }

    async fn upload(&self, file: UploadFile) -> Result<String, ApiError> {
        file.check(self.client.settings().max_upload_bytes)?;
        docintel_debug!("Uploading {:?}", file);

        let url = self.client.endpoint(&["upload"])?;
        let response = self
            .client
            .request(Method::POST, url)
            .multipart(file.into_form()?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        let body: TextResponse = decode_json(response).await?;
        Ok(body.text)
    }

    async fn summarize(
        &self,
        text: &str,
        summary_type: SummaryType,
        length: SummaryLength,
    ) -> Result<String, ApiError> {
        let length = length.as_str();
        let response: SummaryResponse = match summary_type.route() {
            SummaryRoute::Standard => {
                let body = StandardSummaryBody {
                    text,
                    summary_type: SummaryType::Standard.wire_name(),
                    length,
                };
                self.client.post_json(&["summarize"], &body).await?
            }
            SummaryRoute::Fast => {
                let body = FastSummaryBody { text, length };
                self.client.post_json(&["summarize-fast"], &body).await?
            }
            SummaryRoute::Advanced { summary_type } => {
                let body = AdvancedSummaryBody {
                    text,
                    summary_type,
                    length,
                };
                self.client.post_json(&["advanced-summary"], &body).await?
            }
        };
        Ok(response.summary)
    }

    async fn analyze(&self, text: &str) -> Result<Analysis, ApiError> {
        self.client.post_json(&["analyze"], &TextBody { text }).await
    }

    async fn export(
        &self,
        content: &str,
        format: ExportFormat,
        title: &str,
    ) -> Result<Bytes, ApiError> {
        let body = ExportBody {
            content,
            format: format.as_str(),
            title,
        };
        let bytes = self.client.post_for_bytes(&["export"], &body).await?;
        Ok(bytes.freeze())
    }

    async fn save_document(&self, request: &SaveRequest) -> Result<Option<DocumentId>, ApiError> {
        let response: SaveResponse = self.client.post_json(&["documents", "save"], request).await?;
        Ok(response.document_id)
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ApiError> {
        let response: DocumentsResponse = self.client.get_json(&["documents"]).await?;
        Ok(response.documents)
    }

    async fn stats(&self) -> Result<DocumentStats, ApiError> {
        let response: StatsResponse = self
            .client
            .get_json(&["documents", "stats", "overview"])
            .await?;
        Ok(response.stats)
    }

    async fn search_documents(&self, query: &str) -> Result<Vec<DocumentRecord>, ApiError> {
        let response: SearchResponse = self
            .client
            .get_json(&["documents", "search", query])
            .await?;
        Ok(response.results)
    }

    async fn get_document(&self, id: DocumentId) -> Result<DocumentRecord, ApiError> {
        let id = id.to_string();
        let response: DocumentResponse = self.client.get_json(&["documents", &id]).await?;
        Ok(response.document)
    }

    async fn delete_document(&self, id: DocumentId) -> Result<(), ApiError> {
        let id = id.to_string();
        let _: serde_json::Value = self.client.delete_json(&["documents", &id]).await?;
        Ok(())
    }
}
