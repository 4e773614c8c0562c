//! ApiClient - handles communication with the overlay/stream backend.

use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::overlay::Overlay;

/// Environment variable that overrides the configured API base URL.
pub const API_URL_ENV: &str = "STREAM_OVERLAY_API_URL";

/// Default base URL for the backend API.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001/api";

/// Default timeout for HTTP requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend operations, used to pick the fallback message when the backend
/// does not supply one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListOverlays,
    GetOverlay,
    CreateOverlay,
    UpdateOverlay,
    DeleteOverlay,
    StartStream,
    StopStream,
    StreamStatus,
}

impl Operation {
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::ListOverlays => "Failed to fetch overlays",
            Operation::GetOverlay => "Failed to fetch overlay",
            Operation::CreateOverlay => "Failed to save overlay",
            Operation::UpdateOverlay => "Failed to update overlay",
            Operation::DeleteOverlay => "Failed to delete overlay",
            Operation::StartStream => "Failed to start stream",
            Operation::StopStream => "Failed to stop stream",
            Operation::StreamStatus => "Failed to get stream status",
        }
    }
}

/// Request body for `POST /stream/start`.
#[derive(Debug, Serialize)]
struct StartStreamRequest<'a> {
    #[serde(rename = "rtspUrl")]
    rtsp_url: &'a str,
}

/// Response from `POST /stream/start`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamStarted {
    /// Playlist URL of the transcoded stream.
    #[serde(rename = "hlsUrl")]
    pub hls_url: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from `GET /stream/status`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamStatus {
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "hlsUrl", default)]
    pub hls_url: Option<String>,
}

/// Acknowledgement body returned by stop/delete.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body the backend sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// Client for the overlay and stream lifecycle REST API.
///
/// Every method issues exactly one request. There is no retry and no caching.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for `base_url` with the default timeouts.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeouts(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a client with explicit request and connect timeouts.
    pub fn with_timeouts(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidBaseUrl(base_url.to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// List saved overlays.
    pub async fn list_overlays(&self) -> Result<Vec<Overlay>, ApiError> {
        let op = Operation::ListOverlays;
        let url = self.endpoint(&["overlays"])?;
        self.send(op, self.http_client.get(url)).await
    }

    /// Fetch one saved overlay.
    pub async fn get_overlay(&self, id: &str) -> Result<Overlay, ApiError> {
        let op = Operation::GetOverlay;
        let url = self.endpoint(&["overlays", id])?;
        self.send(op, self.http_client.get(url)).await
    }

    /// Persist a new overlay. Returns the stored document including its id.
    pub async fn create_overlay(&self, overlay: &Overlay) -> Result<Overlay, ApiError> {
        let op = Operation::CreateOverlay;
        let url = self.endpoint(&["overlays"])?;
        self.send(op, self.http_client.post(url).json(overlay)).await
    }

    /// Replace the fields of a saved overlay.
    pub async fn update_overlay(&self, id: &str, overlay: &Overlay) -> Result<Overlay, ApiError> {
        let op = Operation::UpdateOverlay;
        let url = self.endpoint(&["overlays", id])?;
        self.send(op, self.http_client.put(url).json(overlay)).await
    }

    /// Delete a saved overlay.
    pub async fn delete_overlay(&self, id: &str) -> Result<Acknowledgement, ApiError> {
        let op = Operation::DeleteOverlay;
        let url = self.endpoint(&["overlays", id])?;
        self.send(op, self.http_client.delete(url)).await
    }

    /// Ask the backend to start transcoding `rtsp_url` to HLS.
    pub async fn start_stream(&self, rtsp_url: &str) -> Result<StreamStarted, ApiError> {
        let op = Operation::StartStream;
        let url = self.endpoint(&["stream", "start"])?;
        let body = StartStreamRequest { rtsp_url };
        self.send(op, self.http_client.post(url).json(&body)).await
    }

    /// Stop the active stream.
    pub async fn stop_stream(&self) -> Result<Acknowledgement, ApiError> {
        let op = Operation::StopStream;
        let url = self.endpoint(&["stream", "stop"])?;
        self.send(op, self.http_client.post(url)).await
    }

    /// Query whether a stream is running.
    pub async fn stream_status(&self) -> Result<StreamStatus, ApiError> {
        let op = Operation::StreamStatus;
        let url = self.endpoint(&["stream", "status"])?;
        self.send(op, self.http_client.get(url)).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        op: Operation,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|source| {
            log::warn!("{:?} request failed: {}", op, source);
            ApiError::Transport {
                message: op.fallback_message().to_string(),
                source,
            }
        })?;

        let status = response.status();
        log::debug!("{:?} -> {}", op, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_error_body(op, status.as_u16(), &body));
        }

        response.json::<T>().await.map_err(|source| {
            log::warn!("{:?} returned an unreadable body: {}", op, source);
            ApiError::Decode {
                message: op.fallback_message().to_string(),
                source,
            }
        })
    }
}

/// Errors returned by [`ApiClient`].
///
/// The display text is always user-facing: either the message the backend
/// supplied or the operation's fallback.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{message}")]
    Backend {
        status: u16,
        message: String,
        /// Extra diagnostics some endpoints attach (e.g. a log file path).
        details: Option<String>,
    },

    #[error("{message}")]
    Decode {
        message: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    fn from_error_body(op: Operation, status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok();
        let (message, details) = match parsed {
            Some(ErrorBody { error, details }) if !error.trim().is_empty() => (error, details),
            Some(ErrorBody { details, .. }) => (op.fallback_message().to_string(), details),
            None => (op.fallback_message().to_string(), None),
        };
        log::warn!("{:?} rejected with status {}: {}", op, status, message);
        ApiError::Backend {
            status,
            message,
            details,
        }
    }

    /// HTTP status for backend-reported errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_client() {
        let client = ApiClient::new(DEFAULT_API_BASE_URL).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5001/api");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = ApiClient::new("http://localhost:5001/api/").unwrap();
        let url = client.endpoint(&["overlays", "abc"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5001/api/overlays/abc");
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let client = ApiClient::new("http://localhost:5001/api").unwrap();
        let url = client.endpoint(&["overlays", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5001/api/overlays/a%2Fb%20c");
    }

    #[test]
    fn test_error_body_message_is_used() {
        let err = ApiError::from_error_body(
            Operation::StartStream,
            400,
            r#"{"error":"RTSP URL is required"}"#,
        );
        assert_eq!(err.to_string(), "RTSP URL is required");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_error_body_details_preserved() {
        let err = ApiError::from_error_body(
            Operation::StartStream,
            500,
            r#"{"error":"Failed to start FFmpeg (timeout).","details":"Log file at /tmp/x.log"}"#,
        );
        match err {
            ApiError::Backend { details, .. } => {
                assert_eq!(details.as_deref(), Some("Log file at /tmp/x.log"))
            }
            other => panic!("Expected Backend error, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_error_body_uses_fallback() {
        let err = ApiError::from_error_body(Operation::DeleteOverlay, 502, "<html>bad gateway</html>");
        assert_eq!(err.to_string(), "Failed to delete overlay");

        let err = ApiError::from_error_body(Operation::ListOverlays, 500, r#"{"error":""}"#);
        assert_eq!(err.to_string(), "Failed to fetch overlays");
    }

    #[test]
    fn test_stream_status_without_url() {
        let status: StreamStatus = serde_json::from_str(r#"{"isActive":false,"hlsUrl":null}"#).unwrap();
        assert!(!status.is_active);
        assert!(status.hls_url.is_none());
    }
}
