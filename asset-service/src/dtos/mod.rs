//! Wire types for the import API.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /import`. Files are imported in the order given.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[validate(length(min = 1, code = "EMPTY_FILE_LIST"), nested)]
    pub files: Vec<ImportFileSpec>,
    #[serde(default)]
    pub tenant_id: Option<i64>,
}

/// One file selected in the provider's picker. `size` is the picker's
/// declared value; provider metadata is authoritative later.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportFileSpec {
    #[validate(length(min = 1, code = "MISSING_FILE_ID"))]
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(default)]
    #[validate(range(min = 0, code = "INVALID_SIZE"))]
    pub size: Option<i64>,
}
