//! Bootstrap data for a fresh store.

use thiserror::Error;

use invsys_auth::{PasswordError, PasswordHasher, Role, RoleStore, UserStore, catalog};
use invsys_core::{RoleLookup, StoreError, UserId, UserLookup};

use crate::stores::{InMemoryRoleStore, InMemoryUserStore, NewRole, NewUser, RoleRepository};

/// Slug of the superuser role created by [`seed_admin`].
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Ensure an `admin` role holding every wildcard grant exists, and an active
/// user `username` assigned to it.
///
/// Idempotent: an existing role or user with the same slug/username is left
/// untouched and the existing user id is returned.
pub fn seed_admin(
    users: &InMemoryUserStore,
    roles: &InMemoryRoleStore,
    hasher: PasswordHasher,
    username: &str,
    password: &str,
) -> Result<UserId, SeedError> {
    if roles.find(&RoleLookup::BySlug(ADMIN_ROLE.to_string()))?.is_none() {
        roles.insert(NewRole {
            slug: Role::new(ADMIN_ROLE),
            name: "Administrator".to_string(),
            permissions: catalog::all_wildcards(),
        })?;
        tracing::info!(role = ADMIN_ROLE, "seeded role");
    }

    if let Some(existing) = users.find(&UserLookup::ByUsername(username.trim().to_string()))? {
        tracing::debug!(user_id = %existing.id, "admin user already present");
        return Ok(existing.id);
    }

    let id = users.insert(NewUser {
        username: username.to_string(),
        display_name: "Administrator".to_string(),
        password_hash: hasher.hash(password)?,
        role: Role::new(ADMIN_ROLE),
        active: true,
    })?;
    tracing::info!(user_id = %id, roles = roles.list_roles()?.len(), "seeded admin user");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use invsys_auth::{PolicyResolver, all_permissions, is_authorized, verify_password};

    use std::sync::Arc;

    use super::*;

    #[test]
    fn seeded_admin_holds_every_permission() {
        let users = InMemoryUserStore::new();
        let roles = Arc::new(InMemoryRoleStore::new());
        let id = seed_admin(&users, &roles, PasswordHasher::new(4), "root", "rootpass").unwrap();

        let record = users.find(&UserLookup::ById(id)).unwrap().unwrap();
        assert!(record.active);
        assert!(verify_password("rootpass", &record.password_hash));

        let policy = PolicyResolver::new(roles).resolve().unwrap();
        for permission in all_permissions() {
            assert!(is_authorized(&record.role, &policy, &permission), "{permission}");
        }
    }

    #[test]
    fn seeding_twice_is_idempotent() {
        let users = InMemoryUserStore::new();
        let roles = InMemoryRoleStore::new();
        let first = seed_admin(&users, &roles, PasswordHasher::new(4), "root", "rootpass").unwrap();
        let second = seed_admin(&users, &roles, PasswordHasher::new(4), "root", "other-pass").unwrap();

        assert_eq!(first, second);
        assert_eq!(users.len().unwrap(), 1);
        assert_eq!(roles.list_roles().unwrap().len(), 1);
    }

    #[test]
    fn weak_admin_password_is_rejected() {
        let users = InMemoryUserStore::new();
        let roles = InMemoryRoleStore::new();
        let err = seed_admin(&users, &roles, PasswordHasher::new(4), "root", "123").unwrap_err();
        assert!(matches!(err, SeedError::Password(PasswordError::WeakInput { .. })));
    }
}
