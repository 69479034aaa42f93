//! File-shape checks that run before any bytes move.

use asset_core::error::{AppError, ErrorCode};

use crate::dtos::{ImportFileSpec, ImportRequest};
use crate::services::drive::DriveFile;

/// Tenant id must be present and positive before the gate can run; the
/// gate consumes it.
pub fn require_tenant(request: &ImportRequest) -> Result<i64, AppError> {
    match request.tenant_id {
        Some(tenant_id) if tenant_id > 0 => Ok(tenant_id),
        _ => Err(AppError::validation(ErrorCode::MissingTenantId)),
    }
}

/// Size and type limits, applied twice per file: to declared request
/// values up front, then to provider metadata once it arrives.
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_size_bytes: i64,
    blocked_mime_prefixes: Vec<String>,
}

impl FileValidator {
    pub fn new(max_size_bytes: i64, blocked_mime_prefixes: Vec<String>) -> Self {
        Self {
            max_size_bytes,
            blocked_mime_prefixes,
        }
    }

    pub fn max_size_bytes(&self) -> i64 {
        self.max_size_bytes
    }

    /// Declared values from the picker. Absent sizes pass here and are
    /// re-checked against metadata.
    pub fn check_declared(&self, file: &ImportFileSpec) -> Result<(), AppError> {
        if let Some(size) = file.size {
            self.check_size(size)?;
        }
        self.check_mime(&file.mime_type)
    }

    /// Provider metadata is authoritative for both size and type.
    pub fn check_resolved(&self, file: &DriveFile) -> Result<(), AppError> {
        if let Some(size) = file.size {
            self.check_size(size)?;
        }
        self.check_mime(&file.mime_type)
    }

    fn check_size(&self, size: i64) -> Result<(), AppError> {
        if size < 0 {
            return Err(AppError::validation(ErrorCode::InvalidSize));
        }
        if size > self.max_size_bytes {
            return Err(AppError::validation_with(
                ErrorCode::FileTooLarge,
                format!(
                    "File exceeds the maximum allowed size of {} bytes",
                    self.max_size_bytes
                ),
            ));
        }
        Ok(())
    }

    fn check_mime(&self, mime_type: &str) -> Result<(), AppError> {
        let blocked = self
            .blocked_mime_prefixes
            .iter()
            .any(|prefix| mime_type.starts_with(prefix.as_str()));
        if blocked {
            return Err(AppError::validation(ErrorCode::UnsupportedFileType));
        }
        Ok(())
    }
}
