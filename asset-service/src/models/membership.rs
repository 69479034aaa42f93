use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Role;

/// Links a user to a tenant. Presence of a row is what grants tenant
/// access; the role travels with the authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantMembership {
    pub user_id: Uuid,
    pub tenant_id: i64,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl TenantMembership {
    pub fn new(user_id: Uuid, tenant_id: i64, role: Role) -> Self {
        Self {
            user_id,
            tenant_id,
            role,
            created_at: Utc::now(),
        }
    }
}
