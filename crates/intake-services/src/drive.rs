//! Drive file-store client and folder resolver.
//!
//! The request pipeline talks to the [`FileStore`] trait; [`DriveClient`] is
//! the Drive v3 implementation. Folder resolution is lookup-before-create:
//! safe to repeat with identical arguments, though two concurrent identical
//! calls may still race and create twins (accepted for this single-server
//! deployment).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::google::GoogleAuth;

const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const DEFAULT_API_BASE: &str = "https://www.googleapis.com";

/// File-store operation errors
#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("Auth failed: {0}")]
    Auth(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("File store API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Result type for file-store operations
pub type FileStoreResult<T> = Result<T, FileStoreError>;

/// File-store abstraction.
///
/// Folder identifiers are opaque strings minted by the backend. Uploads keep
/// the original filename and declared MIME type.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Find a non-trashed folder named exactly `name` directly under
    /// `parent_id`, returning its identifier if present.
    async fn find_folder(&self, parent_id: &str, name: &str) -> FileStoreResult<Option<String>>;

    /// Create a folder named `name` under `parent_id` and return its identifier.
    async fn create_folder(&self, parent_id: &str, name: &str) -> FileStoreResult<String>;

    /// Upload file content under `parent_id` and return the new file identifier.
    async fn upload_file(
        &self,
        parent_id: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> FileStoreResult<String>;

    /// Browsable URL for a folder identifier.
    fn folder_url(&self, folder_id: &str) -> String;

    /// Get-or-create: return the existing folder's identifier, else create it.
    async fn ensure_folder(&self, parent_id: &str, name: &str) -> FileStoreResult<String> {
        if let Some(id) = self.find_folder(parent_id, name).await? {
            return Ok(id);
        }
        self.create_folder(parent_id, name).await
    }
}

#[derive(Debug, Deserialize)]
struct FileResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileResource>,
}

/// Drive v3 client.
pub struct DriveClient {
    http_client: reqwest::Client,
    auth: Arc<GoogleAuth>,
    api_base: String,
}

impl DriveClient {
    pub fn new(auth: Arc<GoogleAuth>) -> Result<Self, anyhow::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http_client,
            auth,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// API base override for tests against a stub server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn bearer(&self) -> FileStoreResult<String> {
        self.auth
            .token()
            .await
            .map_err(|e| FileStoreError::Auth(e.to_string()))
    }

    async fn check_status(response: reqwest::Response) -> FileStoreResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FileStoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Escape a value for embedding in a Drive query string literal.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl FileStore for DriveClient {
    async fn find_folder(&self, parent_id: &str, name: &str) -> FileStoreResult<Option<String>> {
        let query = format!(
            "name = '{}' and '{}' in parents and mimeType = '{}' and trashed = false",
            escape_query_value(name),
            escape_query_value(parent_id),
            FOLDER_MIME_TYPE
        );
        let url = format!(
            "{}/drive/v3/files?q={}&fields=files(id,name)&pageSize=1",
            self.api_base,
            urlencoding::encode(&query)
        );

        let token = self.bearer().await?;
        let response = self.http_client.get(&url).bearer_auth(token).send().await?;
        let response = Self::check_status(response).await?;

        let list: FileList = response.json().await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create_folder(&self, parent_id: &str, name: &str) -> FileStoreResult<String> {
        let url = format!("{}/drive/v3/files?fields=id", self.api_base);
        let body = json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
            "parents": [parent_id],
        });

        let token = self.bearer().await?;
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let resource: FileResource = response.json().await?;
        tracing::debug!(folder = %name, id = %resource.id, "Created folder");
        Ok(resource.id)
    }

    async fn upload_file(
        &self,
        parent_id: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> FileStoreResult<String> {
        // Drive media uploads use multipart/related: a JSON metadata part
        // followed by the raw media part. reqwest's multipart support emits
        // form-data, so the body is assembled by hand.
        const BOUNDARY: &str = "intake_upload_boundary";

        let metadata = json!({
            "name": filename,
            "parents": [parent_id],
        });

        let mut body = Vec::with_capacity(data.len() + 512);
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
        body.extend_from_slice(metadata.to_string().as_bytes());
        body.extend_from_slice(format!("\r\n--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(&data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let url = format!(
            "{}/upload/drive/v3/files?uploadType=multipart&fields=id",
            self.api_base
        );

        let token = self.bearer().await?;
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .header(
                "Content-Type",
                format!("multipart/related; boundary={}", BOUNDARY),
            )
            .body(body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let resource: FileResource = response.json().await?;
        tracing::info!(file = %filename, id = %resource.id, "Uploaded file");
        Ok(resource.id)
    }

    fn folder_url(&self, folder_id: &str) -> String {
        format!("https://drive.google.com/drive/folders/{}", folder_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockFileStore;

    #[test]
    fn escapes_single_quotes_in_query_values() {
        assert_eq!(escape_query_value("O'Brien"), "O\\'Brien");
        assert_eq!(escape_query_value("plain"), "plain");
    }

    #[tokio::test]
    async fn ensure_folder_reuses_an_existing_folder() {
        let store = MockFileStore::new();
        let existing = store.seed_folder("root", "Army");

        let first = store.ensure_folder("root", "Army").await.unwrap();
        let second = store.ensure_folder("root", "Army").await.unwrap();
        assert_eq!(first, existing);
        assert_eq!(second, existing);
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn ensure_folder_creates_once_then_reuses() {
        let store = MockFileStore::new();

        let first = store.ensure_folder("root", "Navy").await.unwrap();
        let second = store.ensure_folder("root", "Navy").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.create_calls(), 1);
    }

    #[tokio::test]
    async fn ensure_folder_distinguishes_parents() {
        let store = MockFileStore::new();

        let a = store.ensure_folder("root", "2024").await.unwrap();
        let b = store.ensure_folder("other", "2024").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.create_calls(), 2);
    }
}
