//! One-shot bulk-upload transport
//!
//! Files of any size go to the backend as a single multipart request. The
//! backend confirms ingestion separately over the event channel, so the
//! response here only says whether the request was accepted.

use std::future::Future;
use std::path::PathBuf;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::error::{ClientError, Result};
use crate::types::identifiers::SessionId;
use crate::types::options::ClientOptions;
use crate::types::uploads::{ProxyKind, UploadCategory};

/// Everything needed to ship one file to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkUploadRequest {
    /// Session the file belongs to
    pub session_id: SessionId,
    /// Sent as `file_type`
    pub category: UploadCategory,
    /// Sent as `proxy_type`; only present for proxy uploads
    pub proxy_kind: Option<ProxyKind>,
    /// Local file to upload
    pub path: PathBuf,
}

/// Backend acknowledgement of an accepted upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadAck {
    /// Human-readable message from the backend
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Request/response transport for bulk files
pub trait BulkUploader: Send + Sync + 'static {
    /// Upload one file
    ///
    /// # Errors
    /// Returns [`ClientError::UploadRejected`] when the backend refuses the file
    /// and [`ClientError::Connection`] when the request never completes
    fn upload(
        &self,
        request: BulkUploadRequest,
    ) -> impl Future<Output = Result<UploadAck>> + Send;
}

/// Multipart HTTP uploader backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpBulkUploader {
    http: Client,
    endpoint: Url,
}

impl HttpBulkUploader {
    /// Create an uploader posting to `endpoint`
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    /// Create an uploader from client options
    ///
    /// # Errors
    /// Returns error if the upload URL cannot be derived
    pub fn from_options(options: &ClientOptions) -> Result<Self> {
        Ok(Self::new(options.upload_url()?))
    }

    /// Endpoint the uploader posts to
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn build_form(request: &BulkUploadRequest) -> Result<Form> {
        let bytes = tokio::fs::read(&request.path).await?;
        let filename = request
            .path
            .file_name()
            .map_or_else(|| "upload.txt".to_string(), |n| n.to_string_lossy().into_owned());

        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(filename))
            .text("session_id", request.session_id.as_str().to_string())
            .text("file_type", request.category.as_str());

        if let Some(kind) = request.proxy_kind {
            form = form.text("proxy_type", kind.as_str());
        }
        Ok(form)
    }
}

impl BulkUploader for HttpBulkUploader {
    async fn upload(&self, request: BulkUploadRequest) -> Result<UploadAck> {
        let form = Self::build_form(&request).await?;
        log::info!(
            "Uploading {} file {} to {}",
            request.category,
            request.path.display(),
            self.endpoint
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::connection(format!("upload request failed: {e}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::connection(format!("upload response unreadable: {e}")))?;

        let message = serde_json::from_slice::<UploadResponse>(&body)
            .ok()
            .and_then(|r| r.message);

        if status == StatusCode::OK {
            let message = message.unwrap_or_else(|| "Upload accepted".to_string());
            log::info!("{} upload accepted: {message}", request.category);
            return Ok(UploadAck { message });
        }

        let message = message.unwrap_or_else(|| status.to_string());
        log::warn!("{} upload rejected ({status}): {message}", request.category);
        Err(ClientError::upload_rejected(message))
    }
}
