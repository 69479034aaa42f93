//! Tenant roles, ordered from weakest to strongest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role comparisons are numeric: a request passes a minimum-role check when
/// its rank is greater than or equal to the required rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Guest,
    Standard,
    Editor,
    Admin,
    SuperAdmin,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(String);

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Guest,
        Role::Standard,
        Role::Editor,
        Role::Admin,
        Role::SuperAdmin,
    ];

    pub fn rank(self) -> u8 {
        match self {
            Role::Guest => 1,
            Role::Standard => 2,
            Role::Editor => 3,
            Role::Admin => 4,
            Role::SuperAdmin => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Standard => "standard",
            Role::Editor => "editor",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "guest" => Ok(Role::Guest),
            "standard" => Ok(Role::Standard),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}
