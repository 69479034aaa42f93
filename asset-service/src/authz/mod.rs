pub mod engine;
pub mod gate;
pub mod matrix;

pub use engine::{can_modify_resource, has_minimum_role, OwnershipPolicy};
pub use gate::{ImportGate, ImportGrant};
pub use matrix::{allowed_actions, has_permission, Action, Resource};
