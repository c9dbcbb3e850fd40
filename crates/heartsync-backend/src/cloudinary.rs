//! Unsigned uploads to a Cloudinary cloud.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{BackendError, BackendResult};
use crate::ports::{ImageHost, LocalImage};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CloudinaryHost {
    client: reqwest::Client,
    endpoint: String,
    upload_preset: String,
}

impl CloudinaryHost {
    pub fn new(cloud_name: &str, upload_preset: impl Into<String>) -> Self {
        Self::with_endpoint(
            format!("{API_BASE}/{cloud_name}/image/upload"),
            upload_preset,
        )
    }

    /// Post to an explicit upload URL instead of the public API.
    pub fn with_endpoint(endpoint: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            upload_preset: upload_preset.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, image: &LocalImage) -> BackendResult<String> {
        let bytes = tokio::fs::read(image.path()).await?;
        debug!(file = %image.file_name(), size = bytes.len(), "Uploading image");

        let part = Part::bytes(bytes)
            .file_name(image.file_name())
            .mime_str(image.mime())?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let body: UploadResponse = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;

        interpret(body)
    }
}

/// The hosted URL, or the service's own error message.
fn interpret(body: UploadResponse) -> BackendResult<String> {
    if let Some(url) = body.secure_url {
        return Ok(url);
    }
    let message = body
        .error
        .and_then(|e| e.message)
        .unwrap_or_else(|| "Unknown error".to_string());
    warn!("Cloudinary upload failed: {message}");
    Err(BackendError::Upload(format!("Cloudinary upload failed: {message}")))
}
