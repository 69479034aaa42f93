//! The import authorization gate.
//!
//! Four checks run in a fixed order and each denial maps to one specific
//! code. The [`ImportGrant`] issued on success is the only proof of
//! authorization the import pipeline accepts, and it can only be
//! constructed here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use asset_core::error::{AppError, ErrorCode};

use crate::authz::matrix::{has_permission, Action, Resource};
use crate::models::Role;
use crate::services::drive::DRIVE_READONLY_SCOPE;
use crate::services::store::{ConnectionStore, MembershipStore};

const TENANT_DENIED_MESSAGE: &str = "Not authorized for this client";

/// Proof that a request passed the gate. Carries the audit identity every
/// imported asset is attributed to.
#[derive(Debug, Clone)]
pub struct ImportGrant {
    requester: Uuid,
    role: Role,
    tenant_id: i64,
    granted_at: DateTime<Utc>,
}

impl ImportGrant {
    pub(crate) fn new(requester: Uuid, role: Role, tenant_id: i64) -> Self {
        Self {
            requester,
            role,
            tenant_id,
            granted_at: Utc::now(),
        }
    }

    pub fn requester(&self) -> Uuid {
        self.requester
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn tenant_id(&self) -> i64 {
        self.tenant_id
    }

    pub fn granted_at(&self) -> DateTime<Utc> {
        self.granted_at
    }
}

pub struct ImportGate {
    memberships: Arc<dyn MembershipStore>,
    connections: Arc<dyn ConnectionStore>,
}

impl ImportGate {
    pub fn new(memberships: Arc<dyn MembershipStore>, connections: Arc<dyn ConnectionStore>) -> Self {
        Self {
            memberships,
            connections,
        }
    }

    /// Checks role grant, tenant membership, Drive connection and read
    /// scope in that order, short-circuiting on the first failure.
    pub async fn authorize_import(
        &self,
        requester: Uuid,
        role: Role,
        tenant_id: i64,
    ) -> Result<ImportGrant, AppError> {
        if !has_permission(role, Action::Create, Resource::Asset)
            || !has_permission(role, Action::Read, Resource::Asset)
        {
            tracing::warn!(
                requester = %requester,
                role = %role,
                "import denied: role lacks asset permissions"
            );
            metrics::counter!("authz_denials_total", "reason" => "role").increment(1);
            return Err(AppError::permission(ErrorCode::RoleInsufficient));
        }

        if role != Role::SuperAdmin {
            let is_member = self.memberships.is_member(requester, tenant_id).await?;
            if !is_member {
                tracing::warn!(
                    requester = %requester,
                    tenant_id,
                    "import denied: requester is not a member of the tenant"
                );
                metrics::counter!("authz_denials_total", "reason" => "tenant").increment(1);
                return Err(AppError::permission_with(
                    ErrorCode::PermissionDenied,
                    TENANT_DENIED_MESSAGE,
                ));
            }
        }

        let connection = match self.connections.find_for_user(requester).await? {
            Some(connection) => connection,
            None => {
                tracing::warn!(requester = %requester, "import denied: no Drive connection");
                metrics::counter!("authz_denials_total", "reason" => "drive_connection")
                    .increment(1);
                return Err(AppError::auth(ErrorCode::DriveAuthRequired));
            }
        };

        if !connection.has_scope(DRIVE_READONLY_SCOPE) {
            tracing::warn!(requester = %requester, "import denied: connection lacks read scope");
            metrics::counter!("authz_denials_total", "reason" => "drive_scope").increment(1);
            return Err(AppError::auth_with(
                ErrorCode::DriveAuthRequired,
                "Drive connection does not grant read access. Please reconnect your account",
            ));
        }

        Ok(ImportGrant::new(requester, role, tenant_id))
    }
}
