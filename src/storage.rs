use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::ident::{KEY_ID_LEN, nano_id};

/// Namespace prefix for uploaded objects.
const KEY_PREFIX: &str = "media";

/// Extension used when the file name has none.
const DEFAULT_EXTENSION: &str = "jpg";

/// Errors from the upload flow. Both remote failures are terminal for the
/// call — there is no automatic retry.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The naming/authorization service refused to issue a write URL.
    #[error("upload authorization failed (status {status}): {message}")]
    Auth { status: u16, message: String },

    /// The byte transfer to the write URL was rejected.
    #[error("upload transfer failed (status {status})")]
    Transfer { status: u16 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Uploads files to remote storage via short-lived signed write URLs.
///
/// The public read URL is a pure function of the object key: no round trip
/// is needed after the transfer.
pub struct StorageClient {
    client: Client,
    auth_base_url: String,
    assets_base_url: String,
    project_id: String,
}

impl StorageClient {
    /// Create a client with the authorization and public-read base URLs from
    /// config. Tests point both at a local mock server.
    pub fn new(project_id: String, auth_base_url: String, assets_base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            auth_base_url,
            assets_base_url,
            project_id,
        }
    }

    /// Upload a file and return its stable public read URL.
    ///
    /// Generates a random object key under the `media/` namespace, obtains a
    /// write-capable URL for it, transfers the raw bytes with the file's
    /// content type, and derives the read URL from the key.
    pub async fn upload(&self, path: &Path) -> Result<String, StorageError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(DEFAULT_EXTENSION);
        let content_type = content_type_for(extension);
        let key = format!("{KEY_PREFIX}/{}.{extension}", nano_id(KEY_ID_LEN));

        let write_url = self.request_write_url(&key).await?;

        let bytes = tokio::fs::read(path).await?;
        let response = self
            .client
            .put(&write_url)
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Transfer {
                status: status.as_u16(),
            });
        }

        Ok(format!("{}/{key}", self.assets_base_url))
    }

    /// Ask the authorization service for a write-capable URL for `key`.
    /// The URL comes back as a plain-text body.
    async fn request_write_url(&self, key: &str) -> Result<String, StorageError> {
        let response = self
            .client
            .get(format!("{}/media/get-upload-url", self.auth_base_url))
            .query(&[("fileName", key), ("projectId", &self.project_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(StorageError::Auth {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }
}

fn content_type_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
