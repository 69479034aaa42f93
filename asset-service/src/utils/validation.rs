//! JSON extraction that rejects with taxonomy errors instead of the
//! framework's default bodies.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use asset_core::error::{AppError, ErrorCode};

/// Validation codes the request DTOs attach, in precedence order:
/// whole-request problems win over per-file ones.
const KNOWN_CODES: [(&str, ErrorCode); 3] = [
    ("EMPTY_FILE_LIST", ErrorCode::EmptyFileList),
    ("MISSING_FILE_ID", ErrorCode::MissingFileId),
    ("INVALID_SIZE", ErrorCode::InvalidSize),
];

pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "request body rejected");
                AppError::validation(ErrorCode::InvalidRequest)
            })?;
        value.validate().map_err(taxonomy_error)?;
        Ok(ValidatedJson(value))
    }
}

/// Map derive-produced validation errors onto taxonomy codes.
pub fn taxonomy_error(errors: ValidationErrors) -> AppError {
    let mut codes = Vec::new();
    collect_codes(&errors, &mut codes);
    for (name, code) in KNOWN_CODES {
        if codes.iter().any(|candidate| candidate == name) {
            return AppError::validation(code);
        }
    }
    AppError::validation(ErrorCode::InvalidRequest)
}

fn collect_codes(errors: &ValidationErrors, out: &mut Vec<String>) {
    for kind in errors.errors().values() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|error| error.code.to_string()));
            }
            ValidationErrorsKind::Struct(nested) => collect_codes(nested, out),
            ValidationErrorsKind::List(map) => {
                for nested in map.values() {
                    collect_codes(nested, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::{ImportFileSpec, ImportRequest};

    fn file(id: &str, size: Option<i64>) -> ImportFileSpec {
        ImportFileSpec {
            id: id.to_string(),
            name: "logo.png".to_string(),
            mime_type: "image/png".to_string(),
            size,
        }
    }

    #[test]
    fn empty_file_lists_map_to_their_code() {
        let request = ImportRequest {
            files: vec![],
            tenant_id: Some(1),
        };
        let err = taxonomy_error(request.validate().unwrap_err());
        assert_eq!(err.code(), ErrorCode::EmptyFileList);
    }

    #[test]
    fn blank_file_ids_map_to_their_code() {
        let request = ImportRequest {
            files: vec![file("", None)],
            tenant_id: Some(1),
        };
        let err = taxonomy_error(request.validate().unwrap_err());
        assert_eq!(err.code(), ErrorCode::MissingFileId);
    }

    #[test]
    fn negative_declared_sizes_map_to_their_code() {
        let request = ImportRequest {
            files: vec![file("1AbC", Some(-5))],
            tenant_id: Some(1),
        };
        let err = taxonomy_error(request.validate().unwrap_err());
        assert_eq!(err.code(), ErrorCode::InvalidSize);
    }

    #[test]
    fn whole_request_codes_take_precedence() {
        // An empty list is also reported before any per-file checks run.
        let request = ImportRequest {
            files: vec![],
            tenant_id: None,
        };
        let err = taxonomy_error(request.validate().unwrap_err());
        assert_eq!(err.code(), ErrorCode::EmptyFileList);
    }
}
