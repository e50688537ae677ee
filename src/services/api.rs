//! HTTP client for the screening backend.
//!
//! Two endpoints are used:
//! - `GET {base}/health` answers whether the backend is up
//! - `POST {base}/upload_resume/` takes a multipart form with `file` and
//!   `job_description` and answers with an [`AnalysisResult`]
//!
//! [`ScreeningApi`] is the seam the session talks to, so tests can swap
//! in a mock or point [`HttpScreeningApi`] at a local server.

use crate::models::{AnalysisResult, ScreenerConfig};
use crate::services::progress::ProgressTracker;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const HEALTH_PATH: &str = "/health";
pub const UPLOAD_PATH: &str = "/upload_resume/";

/// Size of the body chunks progress is reported at
const UPLOAD_CHUNK_SIZE: usize = 16 * 1024;

/// Coarse classification of everything that can go wrong, used for
/// logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidInput,
    Connectivity,
    Timeout,
    ServerError,
    MalformedResponse,
    Cancelled,
}

/// Upload failures. `Display` is the banner text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Upload timed out")]
    Timeout,

    #[error("Network error during upload")]
    Network { detail: String },

    #[error("Server error: {status}")]
    Server { status: u16 },

    #[error("Invalid response from server")]
    MalformedResponse { detail: String },

    #[error("Upload cancelled")]
    Cancelled,

    #[error("Could not prepare the upload: {detail}")]
    InvalidRequest { detail: String },
}

impl UploadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            UploadError::Timeout => ErrorCategory::Timeout,
            UploadError::Network { .. } => ErrorCategory::Connectivity,
            UploadError::Server { .. } => ErrorCategory::ServerError,
            UploadError::MalformedResponse { .. } => ErrorCategory::MalformedResponse,
            UploadError::Cancelled => ErrorCategory::Cancelled,
            UploadError::InvalidRequest { .. } => ErrorCategory::InvalidInput,
        }
    }

    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            UploadError::Timeout
        } else {
            UploadError::Network {
                detail: error.to_string(),
            }
        }
    }
}

/// Health probe failures. `Display` is the banner text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error(
        "Connection timeout: The backend server at {url} is not responding within {timeout_secs} seconds."
    )]
    Timeout { url: String, timeout_secs: u64 },

    #[error(
        "Network error: Cannot reach the backend server at {url}. Please ensure it is running and accessible."
    )]
    Network { url: String, detail: String },

    #[error("Cannot connect to backend server at {url}: HTTP error! Status: {status}")]
    Status { url: String, status: u16 },

    #[error("Cannot connect to backend server at {url}: invalid health response")]
    MalformedResponse { url: String },
}

impl ProbeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProbeError::Timeout { .. } => ErrorCategory::Timeout,
            ProbeError::Network { .. } => ErrorCategory::Connectivity,
            ProbeError::Status { .. } => ErrorCategory::ServerError,
            ProbeError::MalformedResponse { .. } => ErrorCategory::MalformedResponse,
        }
    }
}

/// Everything needed to build the multipart upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub mime_type: String,
    pub contents: Bytes,
    pub job_description: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScreeningApi: Send + Sync {
    /// Base URL shown in messages and logs
    fn base_url(&self) -> String;

    /// Probe `GET /health`. Any parseable JSON body counts as healthy.
    async fn check_health(&self) -> Result<serde_json::Value, ProbeError>;

    /// Upload a resume and job description for analysis.
    ///
    /// Progress is published on `progress` and stays below 100; the caller
    /// completes it once it accepts the result. Cancelling `cancel` aborts
    /// the request.
    async fn upload_resume(
        &self,
        request: UploadRequest,
        progress: ProgressTracker,
        cancel: CancellationToken,
    ) -> Result<AnalysisResult, UploadError>;
}

/// [`ScreeningApi`] over reqwest
#[derive(Debug, Clone)]
pub struct HttpScreeningApi {
    http: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
    upload_timeout: Duration,
}

impl HttpScreeningApi {
    pub fn new(config: &ScreenerConfig) -> Result<Self, reqwest::Error> {
        Self::with_base_url(
            config.base_url(),
            Duration::from_secs(config.health_timeout_secs),
            Duration::from_secs(config.upload_timeout_secs),
        )
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        health_timeout: Duration,
        upload_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            health_timeout,
            upload_timeout,
        })
    }

    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, HEALTH_PATH)
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, UPLOAD_PATH)
    }

    async fn send_upload(&self, form: Form) -> Result<AnalysisResult, UploadError> {
        let response = self
            .http
            .post(self.upload_url())
            .header(ACCEPT, "application/json")
            .multipart(form)
            .timeout(self.upload_timeout)
            .send()
            .await
            .map_err(UploadError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Server {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(UploadError::from_transport)?;

        serde_json::from_slice::<AnalysisResult>(&body).map_err(|e| {
            UploadError::MalformedResponse {
                detail: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl ScreeningApi for HttpScreeningApi {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    async fn check_health(&self) -> Result<serde_json::Value, ProbeError> {
        let url = self.health_url();
        debug!("Probing backend health at {}", url);

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| self.probe_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status {
                url: self.base_url.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.probe_transport_error(e)
                } else {
                    ProbeError::MalformedResponse {
                        url: self.base_url.clone(),
                    }
                }
            })
    }

    async fn upload_resume(
        &self,
        request: UploadRequest,
        progress: ProgressTracker,
        cancel: CancellationToken,
    ) -> Result<AnalysisResult, UploadError> {
        let UploadRequest {
            file_name,
            mime_type,
            contents,
            job_description,
        } = request;

        let total = contents.len() as u64;
        info!(
            "Uploading {} ({} bytes, {}) to {}",
            file_name,
            total,
            mime_type,
            self.upload_url()
        );

        let part = Part::stream_with_length(progress_body(contents, progress), total)
            .file_name(file_name)
            .mime_str(&mime_type)
            .map_err(|e| UploadError::InvalidRequest {
                detail: e.to_string(),
            })?;
        let form = Form::new()
            .part("file", part)
            .text("job_description", job_description);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(UploadError::Cancelled),
            result = self.send_upload(form) => result,
        };

        if let Err(e) = &result {
            warn!("Upload failed ({:?}): {:?}", e.category(), e);
        }
        result
    }
}

impl HttpScreeningApi {
    fn probe_transport_error(&self, error: reqwest::Error) -> ProbeError {
        if error.is_timeout() {
            ProbeError::Timeout {
                url: self.base_url.clone(),
                timeout_secs: self.health_timeout.as_secs(),
            }
        } else {
            ProbeError::Network {
                url: self.base_url.clone(),
                detail: error.to_string(),
            }
        }
    }
}

/// Stream `contents` in chunks, publishing progress as each chunk is
/// handed to the transport.
fn progress_body(contents: Bytes, progress: ProgressTracker) -> reqwest::Body {
    let total = contents.len() as u64;
    let chunks: Vec<Bytes> = (0..contents.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| contents.slice(start..(start + UPLOAD_CHUNK_SIZE).min(contents.len())))
        .collect();

    let mut sent = 0u64;
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        progress.report(sent, total);
        Ok::<Bytes, std::io::Error>(chunk)
    });

    reqwest::Body::wrap_stream(stream)
}
