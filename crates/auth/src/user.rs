//! Credential records as seen by the auth core.
//!
//! The user store owns these records; the core reads the hash and role slug,
//! and writes a new hash on password change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use invsys_core::{Entity, StoreError, UserId, UserLookup};

use crate::{Permission, PolicyMap, Role, authorize::is_authorized, password::PasswordHash};

/// A user's stored credentials and role assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub active: bool,
}

impl CredentialRecord {
    /// Whether this user's current role grants `required` under `policy`.
    pub fn can(&self, required: &Permission, policy: &PolicyMap) -> bool {
        is_authorized(&self.role, policy, required)
    }

    /// Public view of the record (never includes the hash).
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role.clone(),
        }
    }
}

impl Entity for CredentialRecord {
    type Id = UserId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// User fields safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

/// Access to the persistent user store (external collaborator).
pub trait UserStore: Send + Sync {
    fn find(&self, lookup: &UserLookup) -> Result<Option<CredentialRecord>, StoreError>;

    fn update_password_hash(&self, id: UserId, hash: PasswordHash) -> Result<(), StoreError>;
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn find(&self, lookup: &UserLookup) -> Result<Option<CredentialRecord>, StoreError> {
        (**self).find(lookup)
    }

    fn update_password_hash(&self, id: UserId, hash: PasswordHash) -> Result<(), StoreError> {
        (**self).update_password_hash(id, hash)
    }
}
