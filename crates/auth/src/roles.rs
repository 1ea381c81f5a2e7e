use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use invsys_core::{Entity, RoleId};

use crate::Permission;

/// Role slug used for RBAC (e.g. `"manager"`).
///
/// Slugs are opaque at this layer; what a role may do is decided by the
/// policy map resolved from the role store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

/// A role as persisted by the role store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub slug: Role,
    pub name: String,
    pub permissions: Vec<Permission>,
}

impl RoleRecord {
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }
}

impl Entity for RoleRecord {
    type Id = RoleId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
