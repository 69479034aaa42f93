//! The role/resource/action permission matrix.
//!
//! Grants are spelled out as one exhaustive match: adding a role or a
//! resource will not compile until every new combination has an explicit
//! row here.

use serde::{Deserialize, Serialize};

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Asset,
    Category,
    Tag,
    User,
    Tenant,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Asset,
        Resource::Category,
        Resource::Tag,
        Resource::User,
        Resource::Tenant,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Share,
    ManageRoles,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Share,
        Action::ManageRoles,
    ];
}

const EVERY_ACTION: &[Action] = &[
    Action::Create,
    Action::Read,
    Action::Update,
    Action::Delete,
    Action::Share,
    Action::ManageRoles,
];

/// Actions the role may take on the resource type, before any ownership
/// restriction is applied.
pub fn allowed_actions(role: Role, resource: Resource) -> &'static [Action] {
    use Action::*;

    match (role, resource) {
        (Role::Guest, Resource::Asset) => &[Read],
        (Role::Guest, Resource::Category) => &[Read],
        (Role::Guest, Resource::Tag) => &[Read],
        (Role::Guest, Resource::User) => &[],
        (Role::Guest, Resource::Tenant) => &[],

        (Role::Standard, Resource::Asset) => &[Create, Read, Update, Delete],
        (Role::Standard, Resource::Category) => &[Read],
        (Role::Standard, Resource::Tag) => &[Create, Read],
        (Role::Standard, Resource::User) => &[],
        (Role::Standard, Resource::Tenant) => &[],

        (Role::Editor, Resource::Asset) => &[Create, Read, Update, Delete, Share],
        (Role::Editor, Resource::Category) => &[Create, Read, Update, Delete],
        (Role::Editor, Resource::Tag) => &[Create, Read, Update, Delete],
        (Role::Editor, Resource::User) => &[Read],
        (Role::Editor, Resource::Tenant) => &[],

        (Role::Admin, Resource::Asset) => &[Create, Read, Update, Delete, Share],
        (Role::Admin, Resource::Category) => &[Create, Read, Update, Delete],
        (Role::Admin, Resource::Tag) => &[Create, Read, Update, Delete],
        (Role::Admin, Resource::User) => &[Create, Read, Update, Delete, ManageRoles],
        (Role::Admin, Resource::Tenant) => &[Read, Update],

        (Role::SuperAdmin, _) => EVERY_ACTION,
    }
}

pub fn has_permission(role: Role, action: Action, resource: Resource) -> bool {
    allowed_actions(role, resource).contains(&action)
}
