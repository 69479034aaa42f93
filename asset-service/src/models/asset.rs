use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authz::gate::ImportGrant;
use crate::services::drive::DriveFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Shared,
}

/// Provenance of an imported asset, kept for audit queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSource {
    pub provider_file_id: String,
    pub owner: Option<String>,
    pub shared: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    pub tenant_id: i64,
    pub uploaded_by: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_key: String,
    pub visibility: Visibility,
    pub source: AssetSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// The only construction path for imported assets. `uploaded_by` and
    /// `tenant_id` come from the grant, never from the source file, so the
    /// importing user is always the accountable party.
    pub fn from_import(
        grant: &ImportGrant,
        source: &DriveFile,
        storage_key: String,
        size: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id: grant.tenant_id(),
            uploaded_by: grant.requester(),
            file_name: source.name.clone(),
            mime_type: source.mime_type.clone(),
            size,
            storage_key,
            // Imports are visible tenant-wide; the provider's own sharing
            // flags survive only inside `source`.
            visibility: Visibility::Shared,
            source: AssetSource {
                provider_file_id: source.id.clone(),
                owner: source.owner.clone(),
                shared: source.shared,
            },
            created_at: now,
            updated_at: now,
        }
    }
}
