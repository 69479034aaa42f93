//! Client for the external Drive provider's file API.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use asset_core::error::{classify_upstream_message, ErrorCode};

use crate::services::token::AccessToken;

/// OAuth scope imports require. Read-only: the importer never mutates the
/// user's Drive.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const FILE_FIELDS: &str = "id,name,mimeType,size,shared,owners";

#[derive(Debug, Clone, PartialEq)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: Option<i64>,
    pub owner: Option<String>,
    pub shared: bool,
}

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("file not found in Drive")]
    NotFound,
    #[error("access to the Drive file was denied")]
    AccessDenied,
    #[error("Drive rejected the access token")]
    AuthRejected,
    #[error("Drive API returned status {status}")]
    Api { status: u16 },
    #[error("Drive request failed")]
    Network(#[source] reqwest::Error),
}

impl DriveError {
    /// Upstream statuses map directly; free-text network errors fall back
    /// to the heuristic classifier.
    pub fn code(&self) -> ErrorCode {
        match self {
            DriveError::NotFound => ErrorCode::DriveFileNotFound,
            DriveError::AccessDenied => ErrorCode::DriveAccessDenied,
            DriveError::AuthRejected => ErrorCode::TokenExpired,
            DriveError::Api { .. } => ErrorCode::DriveApiError,
            DriveError::Network(err) => classify_upstream_message(&err.to_string()),
        }
    }

    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            DriveError::NotFound => Some(404),
            DriveError::AccessDenied => Some(403),
            DriveError::AuthRejected => Some(401),
            DriveError::Api { status } => Some(*status),
            DriveError::Network(_) => None,
        }
    }
}

#[async_trait]
pub trait DriveClient: Send + Sync {
    async fn get_file(&self, token: &AccessToken, file_id: &str) -> Result<DriveFile, DriveError>;
    async fn download(&self, token: &AccessToken, file_id: &str) -> Result<Vec<u8>, DriveError>;
}

pub struct HttpDriveClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDriveClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.base_url.trim_end_matches('/'), file_id)
    }
}

/// Provider metadata wire shape. `size` arrives as a stringified int64.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata {
    id: String,
    name: String,
    mime_type: String,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    shared: bool,
    #[serde(default)]
    owners: Vec<OwnerMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnerMetadata {
    #[serde(default)]
    email_address: Option<String>,
}

impl From<FileMetadata> for DriveFile {
    fn from(meta: FileMetadata) -> Self {
        DriveFile {
            id: meta.id,
            name: meta.name,
            mime_type: meta.mime_type,
            size: meta.size.and_then(|raw| raw.parse().ok()),
            owner: meta
                .owners
                .into_iter()
                .find_map(|owner| owner.email_address),
            shared: meta.shared,
        }
    }
}

fn error_for_status(status: reqwest::StatusCode) -> Option<DriveError> {
    if status.is_success() {
        return None;
    }
    Some(match status.as_u16() {
        404 => DriveError::NotFound,
        403 => DriveError::AccessDenied,
        401 => DriveError::AuthRejected,
        other => DriveError::Api { status: other },
    })
}

#[async_trait]
impl DriveClient for HttpDriveClient {
    async fn get_file(&self, token: &AccessToken, file_id: &str) -> Result<DriveFile, DriveError> {
        let response = self
            .http
            .get(self.file_url(file_id))
            .query(&[("fields", FILE_FIELDS)])
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(DriveError::Network)?;

        if let Some(err) = error_for_status(response.status()) {
            return Err(err);
        }
        let metadata: FileMetadata = response.json().await.map_err(DriveError::Network)?;
        Ok(metadata.into())
    }

    async fn download(&self, token: &AccessToken, file_id: &str) -> Result<Vec<u8>, DriveError> {
        let response = self
            .http
            .get(self.file_url(file_id))
            .query(&[("alt", "media")])
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(DriveError::Network)?;

        if let Some(err) = error_for_status(response.status()) {
            return Err(err);
        }
        let bytes = response.bytes().await.map_err(DriveError::Network)?;
        Ok(bytes.to_vec())
    }
}
