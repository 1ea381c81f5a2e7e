//! Lookup keys for records addressable either by numeric id or by a unique
//! string key.
//!
//! The variant is decided once, where the request is parsed, so stores and the
//! auth core never inspect an untyped "id or name" value.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::id::{RoleId, UserId};

/// How to find a user record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum UserLookup {
    ById(UserId),
    ByUsername(String),
}

/// How to find a role record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum RoleLookup {
    ById(RoleId),
    BySlug(String),
}

impl From<UserId> for UserLookup {
    fn from(value: UserId) -> Self {
        Self::ById(value)
    }
}

impl From<RoleId> for RoleLookup {
    fn from(value: RoleId) -> Self {
        Self::ById(value)
    }
}

/// Path segments that parse as an integer are ids; anything else is a name.
impl FromStr for UserLookup {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::validation("empty user key"));
        }
        match s.parse::<i64>() {
            Ok(id) => Ok(Self::ById(UserId::new(id))),
            Err(_) => Ok(Self::ByUsername(s.to_string())),
        }
    }
}

impl FromStr for RoleLookup {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::validation("empty role key"));
        }
        match s.parse::<i64>() {
            Ok(id) => Ok(Self::ById(RoleId::new(id))),
            Err(_) => Ok(Self::BySlug(s.to_string())),
        }
    }
}
