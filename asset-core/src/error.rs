//! Error taxonomy shared by every service in the workspace.
//!
//! Errors raised inside the platform carry an explicit [`ErrorCode`]; the code
//! decides the HTTP status and the sanitized client message. Free-text
//! classification exists only as a last resort for raw upstream provider
//! errors, never for errors we raised ourselves.

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse grouping of error codes. Every category maps to one HTTP status,
/// except `External` where the upstream status decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Permission,
    Auth,
    NotFound,
    Validation,
    RateLimit,
    External,
    System,
}

impl ErrorCategory {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCategory::Permission => StatusCode::FORBIDDEN,
            ErrorCategory::Auth => StatusCode::UNAUTHORIZED,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            ErrorCategory::External => StatusCode::BAD_GATEWAY,
            ErrorCategory::System => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Stable machine-readable error codes returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    PermissionDenied,
    RoleInsufficient,
    NotAuthenticated,
    DriveAuthRequired,
    TokenExpired,
    TokenRefreshFailed,
    FileNotFound,
    AssetNotFound,
    InvalidRequest,
    EmptyFileList,
    MissingTenantId,
    MissingFileId,
    InvalidSize,
    FileTooLarge,
    UnsupportedFileType,
    RateLimitExceeded,
    DriveFileNotFound,
    DriveAccessDenied,
    DriveApiError,
    InternalError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 20] = [
        ErrorCode::PermissionDenied,
        ErrorCode::RoleInsufficient,
        ErrorCode::NotAuthenticated,
        ErrorCode::DriveAuthRequired,
        ErrorCode::TokenExpired,
        ErrorCode::TokenRefreshFailed,
        ErrorCode::FileNotFound,
        ErrorCode::AssetNotFound,
        ErrorCode::InvalidRequest,
        ErrorCode::EmptyFileList,
        ErrorCode::MissingTenantId,
        ErrorCode::MissingFileId,
        ErrorCode::InvalidSize,
        ErrorCode::FileTooLarge,
        ErrorCode::UnsupportedFileType,
        ErrorCode::RateLimitExceeded,
        ErrorCode::DriveFileNotFound,
        ErrorCode::DriveAccessDenied,
        ErrorCode::DriveApiError,
        ErrorCode::InternalError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::RoleInsufficient => "ROLE_INSUFFICIENT",
            ErrorCode::NotAuthenticated => "NOT_AUTHENTICATED",
            ErrorCode::DriveAuthRequired => "DRIVE_AUTH_REQUIRED",
            ErrorCode::TokenExpired => "TOKEN_EXPIRED",
            ErrorCode::TokenRefreshFailed => "TOKEN_REFRESH_FAILED",
            ErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ErrorCode::AssetNotFound => "ASSET_NOT_FOUND",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::EmptyFileList => "EMPTY_FILE_LIST",
            ErrorCode::MissingTenantId => "MISSING_TENANT_ID",
            ErrorCode::MissingFileId => "MISSING_FILE_ID",
            ErrorCode::InvalidSize => "INVALID_SIZE",
            ErrorCode::FileTooLarge => "FILE_TOO_LARGE",
            ErrorCode::UnsupportedFileType => "UNSUPPORTED_FILE_TYPE",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::DriveFileNotFound => "DRIVE_FILE_NOT_FOUND",
            ErrorCode::DriveAccessDenied => "DRIVE_ACCESS_DENIED",
            ErrorCode::DriveApiError => "DRIVE_API_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorCode::PermissionDenied | ErrorCode::RoleInsufficient => ErrorCategory::Permission,
            ErrorCode::NotAuthenticated
            | ErrorCode::DriveAuthRequired
            | ErrorCode::TokenExpired
            | ErrorCode::TokenRefreshFailed => ErrorCategory::Auth,
            ErrorCode::FileNotFound | ErrorCode::AssetNotFound => ErrorCategory::NotFound,
            ErrorCode::InvalidRequest
            | ErrorCode::EmptyFileList
            | ErrorCode::MissingTenantId
            | ErrorCode::MissingFileId
            | ErrorCode::InvalidSize
            | ErrorCode::FileTooLarge
            | ErrorCode::UnsupportedFileType => ErrorCategory::Validation,
            ErrorCode::RateLimitExceeded => ErrorCategory::RateLimit,
            ErrorCode::DriveFileNotFound
            | ErrorCode::DriveAccessDenied
            | ErrorCode::DriveApiError => ErrorCategory::External,
            ErrorCode::InternalError => ErrorCategory::System,
        }
    }

    /// HTTP status for the code. External passthrough codes mirror the
    /// upstream condition instead of their category default.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::DriveFileNotFound => StatusCode::NOT_FOUND,
            ErrorCode::DriveAccessDenied => StatusCode::FORBIDDEN,
            other => other.category().status(),
        }
    }

    /// Sanitized, user-facing default message. Never includes tokens,
    /// connection strings or upstream response bodies.
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorCode::PermissionDenied => "You do not have permission to perform this action",
            ErrorCode::RoleInsufficient => "Your role does not allow this operation",
            ErrorCode::NotAuthenticated => "Not authenticated",
            ErrorCode::DriveAuthRequired => {
                "Drive authorization required. Please connect your Drive account"
            }
            ErrorCode::TokenExpired => "Drive access has expired. Please reconnect your account",
            ErrorCode::TokenRefreshFailed => "Could not refresh Drive access",
            ErrorCode::FileNotFound => "File not found",
            ErrorCode::AssetNotFound => "Asset not found",
            ErrorCode::InvalidRequest => "Request body is invalid",
            ErrorCode::EmptyFileList => "At least one file is required",
            ErrorCode::MissingTenantId => "A valid tenant id is required",
            ErrorCode::MissingFileId => "Each file must include an id",
            ErrorCode::InvalidSize => "File size must be a non-negative number",
            ErrorCode::FileTooLarge => "File exceeds the maximum allowed size",
            ErrorCode::UnsupportedFileType => "This file type cannot be imported",
            ErrorCode::RateLimitExceeded => "Too many import requests. Please try again later",
            ErrorCode::DriveFileNotFound => "File not found in Drive",
            ErrorCode::DriveAccessDenied => "Access to this Drive file was denied",
            ErrorCode::DriveApiError => "Drive request failed",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

/// JSON body for every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.default_message().to_string(),
            code,
            details: None,
            metadata: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            details: None,
            metadata: None,
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Application-level error. Converts into an HTTP response with the
/// taxonomy body; internal errors are logged in full and returned sanitized.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { code: ErrorCode, message: String },
    #[error("{message}")]
    Permission { code: ErrorCode, message: String },
    #[error("{message}")]
    Auth { code: ErrorCode, message: String },
    #[error("{message}")]
    NotFound { code: ErrorCode, message: String },
    #[error("rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { limit: u32, retry_after_secs: u64 },
    #[error("{message}")]
    External {
        code: ErrorCode,
        message: String,
        upstream_status: Option<u16>,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(code: ErrorCode) -> Self {
        AppError::Validation {
            code,
            message: code.default_message().to_string(),
        }
    }

    pub fn validation_with(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn permission(code: ErrorCode) -> Self {
        AppError::Permission {
            code,
            message: code.default_message().to_string(),
        }
    }

    pub fn permission_with(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Permission {
            code,
            message: message.into(),
        }
    }

    pub fn auth(code: ErrorCode) -> Self {
        AppError::Auth {
            code,
            message: code.default_message().to_string(),
        }
    }

    pub fn auth_with(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Auth {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: ErrorCode) -> Self {
        AppError::NotFound {
            code,
            message: code.default_message().to_string(),
        }
    }

    pub fn external(code: ErrorCode, upstream_status: Option<u16>) -> Self {
        AppError::External {
            code,
            message: code.default_message().to_string(),
            upstream_status,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. }
            | AppError::Permission { code, .. }
            | AppError::Auth { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::External { code, .. } => *code,
            AppError::RateLimited { .. } => ErrorCode::RateLimitExceeded,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.code().status()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Internal(anyhow::Error::new(err).context("configuration error"))
    }
}

static RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation { code, message }
            | AppError::Permission { code, message }
            | AppError::Auth { code, message }
            | AppError::NotFound { code, message } => {
                (code.status(), ErrorBody::with_message(code, message))
            }
            AppError::RateLimited {
                limit,
                retry_after_secs,
            } => {
                let body = ErrorBody::new(ErrorCode::RateLimitExceeded).metadata(
                    serde_json::json!({ "limit": limit, "retryAfterSeconds": retry_after_secs }),
                );
                let mut response =
                    (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                let headers = response.headers_mut();
                headers.insert(RATELIMIT_LIMIT.clone(), HeaderValue::from(limit));
                headers.insert(RATELIMIT_REMAINING.clone(), HeaderValue::from(0u16));
                headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                return response;
            }
            AppError::External {
                code,
                message,
                upstream_status,
            } => {
                let mut body = ErrorBody::with_message(code, message);
                if let Some(upstream) = upstream_status {
                    body = body.metadata(serde_json::json!({ "upstreamStatus": upstream }));
                }
                (code.status(), body)
            }
            AppError::Internal(err) => {
                // Full chain goes to the log; the client sees a generic body.
                tracing::error!(error = ?err, "unhandled internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(ErrorCode::InternalError),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Best-effort classification of raw error text coming back from the
/// external provider. This is a fallback for messages we did not raise
/// ourselves; authorization decisions never route through it.
pub fn classify_upstream_message(message: &str) -> ErrorCode {
    let lower = message.to_ascii_lowercase();
    if lower.contains("permission") || lower.contains("forbidden") || lower.contains("access denied")
    {
        ErrorCode::DriveAccessDenied
    } else if lower.contains("not found") || lower.contains("notfound") {
        ErrorCode::DriveFileNotFound
    } else if lower.contains("expired")
        || lower.contains("invalid_grant")
        || lower.contains("unauthorized")
    {
        ErrorCode::TokenExpired
    } else {
        ErrorCode::DriveApiError
    }
}
