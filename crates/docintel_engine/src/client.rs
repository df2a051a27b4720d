use std::time::Duration;

use bytes::BytesMut;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::{ApiError, FailureKind};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:4000";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_upload_bytes: u64,
    /// Cap on exported file bodies.
    pub max_download_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_upload_bytes: 50 * 1024 * 1024,
            max_download_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Thin JSON layer over `reqwest` shared by every endpoint.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    http: reqwest::Client,
    base: Url,
    settings: ApiSettings,
}

impl ApiClient {
    pub(crate) fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = Url::parse(settings.base_url.trim())
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            http,
            base,
            settings,
        })
    }

    pub(crate) fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Joins `segments` onto the base url, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.send_json(Method::GET, segments, None::<&()>).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::POST, segments, Some(body)).await
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.send_json(Method::DELETE, segments, None::<&()>).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        let mut request = self
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            let encoded = serde_json::to_vec(body)
                .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
            request = request.body(encoded);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        decode_json(response).await
    }

    /// POSTs JSON and streams back a binary body, enforcing the download cap.
    pub(crate) async fn post_for_bytes<B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<BytesMut, ApiError> {
        let url = self.endpoint(segments)?;
        let encoded = serde_json::to_vec(body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        let response = self
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "application/json")
            .body(encoded)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;

        let max_bytes = self.settings.max_download_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = buffer.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer)
    }
}

pub(crate) fn too_large(max_bytes: u64, actual: Option<u64>) -> ApiError {
    ApiError::new(
        FailureKind::TooLarge { max_bytes, actual },
        format!("payload exceeds the {max_bytes} byte limit"),
    )
}

/// Passes a 2xx response through; otherwise turns the body into an error.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    Err(ApiError::new(
        FailureKind::HttpStatus(status.as_u16()),
        error_message(status, &body),
    ))
}

/// `detail` from a JSON error body, or `HTTP <status>`.
pub(crate) fn error_message(status: StatusCode, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());
    match detail {
        Some(Value::String(detail)) if !detail.is_empty() => detail,
        Some(Value::Null) | Some(Value::String(_)) | None => format!("HTTP {}", status.as_u16()),
        Some(other) => other.to_string(),
    }
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body)
        .map_err(|err| ApiError::new(FailureKind::Decode, format!("unexpected response: {err}")))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, "request timed out");
    }
    if err.is_builder() {
        return ApiError::new(FailureKind::InvalidUrl, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_string_detail() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(
            error_message(status, br#"{"detail": "Missing text to summarize"}"#),
            "Missing text to summarize"
        );
        assert_eq!(
            error_message(status, br#"{"detail": [{"loc": ["body", "text"]}]}"#),
            r#"[{"loc":["body","text"]}]"#
        );
        assert_eq!(error_message(status, b"<html>oops</html>"), "HTTP 400");
        assert_eq!(error_message(status, br#"{"error": "x"}"#), "HTTP 400");
    }

    #[test]
    fn endpoint_encodes_each_segment() {
        let client = ApiClient::new(ApiSettings {
            base_url: "http://localhost:4000/api/".to_string(),
            ..ApiSettings::default()
        })
        .unwrap();
        let url = client
            .endpoint(&["documents", "search", "q3 report/draft"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:4000/api/documents/search/q3%20report%2Fdraft"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        let err = ApiClient::new(ApiSettings {
            base_url: "not a url".to_string(),
            ..ApiSettings::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
