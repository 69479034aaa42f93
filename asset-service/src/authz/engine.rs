//! Permission checks layered on top of the static matrix.

use uuid::Uuid;

use crate::authz::matrix::{has_permission, Action, Resource};
use crate::models::Role;

/// Which roles may only modify resources they own. The policy is named
/// data, not scattered conditionals, so tightening or loosening it is a
/// one-line change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipPolicy {
    restricted: &'static [Role],
}

impl OwnershipPolicy {
    /// Standard and Editor modify only what they own; Admin and above act
    /// tenant-wide.
    pub const fn owner_restricted() -> Self {
        Self {
            restricted: &[Role::Standard, Role::Editor],
        }
    }

    /// No ownership restriction; matrix grants apply tenant-wide.
    pub const fn tenant_wide() -> Self {
        Self { restricted: &[] }
    }

    pub fn restricts(&self, role: Role) -> bool {
        self.restricted.contains(&role)
    }
}

impl Default for OwnershipPolicy {
    fn default() -> Self {
        OwnershipPolicy::owner_restricted()
    }
}

pub fn has_minimum_role(role: Role, required: Role) -> bool {
    role.rank() >= required.rank()
}

/// Modification gate: the matrix grant comes first, then ownership for
/// restricted roles. An unknown owner denies rather than allows.
pub fn can_modify_resource(
    policy: OwnershipPolicy,
    role: Role,
    action: Action,
    resource: Resource,
    requester: Uuid,
    owner: Option<Uuid>,
) -> bool {
    if !has_permission(role, action, resource) {
        return false;
    }
    if !matches!(action, Action::Update | Action::Delete) {
        return true;
    }
    if !policy.restricts(role) {
        return true;
    }
    owner == Some(requester)
}
