//! Role administration: granting and revoking permissions on a role.
//!
//! Every edit lands in the role store, so the next authorization decision
//! (which resolves the policy fresh) sees it without a restart.

use std::sync::Arc;

use thiserror::Error;

use invsys_auth::{Permission, RoleRecord};
use invsys_core::{RoleId, RoleLookup, StoreError};

use crate::stores::RoleRepository;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleAdminError {
    #[error("unknown permission '{0}'")]
    UnknownPermission(Permission),

    #[error("role not found")]
    RoleNotFound,

    #[error("role store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct RoleAdmin {
    repo: Arc<dyn RoleRepository>,
}

impl RoleAdmin {
    pub fn new(repo: Arc<dyn RoleRepository>) -> Self {
        Self { repo }
    }

    pub fn get(&self, lookup: &RoleLookup) -> Result<RoleRecord, RoleAdminError> {
        self.repo.find(lookup)?.ok_or(RoleAdminError::RoleNotFound)
    }

    /// Grant `permission`. Granting one the role already holds is a no-op.
    pub fn add_permission(
        &self,
        lookup: &RoleLookup,
        permission: Permission,
    ) -> Result<RoleRecord, RoleAdminError> {
        ensure_known(&permission)?;
        let current = self.get(lookup)?;
        if current.has_permission(&permission) {
            return Ok(current);
        }

        let mut granted = false;
        let role = self.modify(current.id, &mut |permissions| {
            if !permissions.contains(&permission) {
                permissions.push(permission.clone());
                granted = true;
            }
        })?;
        if granted {
            tracing::info!(role = %role.slug, %permission, "permission granted");
        }
        Ok(role)
    }

    /// Revoke `permission`. Revoking one the role does not hold is a no-op.
    pub fn remove_permission(
        &self,
        lookup: &RoleLookup,
        permission: &Permission,
    ) -> Result<RoleRecord, RoleAdminError> {
        let id = self.get(lookup)?.id;

        let mut revoked = false;
        let role = self.modify(id, &mut |permissions| {
            let before = permissions.len();
            permissions.retain(|p| p != permission);
            revoked = permissions.len() != before;
        })?;
        if revoked {
            tracing::info!(role = %role.slug, %permission, "permission revoked");
        }
        Ok(role)
    }

    /// Replace the whole permission set. Duplicates are collapsed, order kept.
    pub fn set_permissions(
        &self,
        lookup: &RoleLookup,
        permissions: Vec<Permission>,
    ) -> Result<RoleRecord, RoleAdminError> {
        let mut deduped: Vec<Permission> = Vec::with_capacity(permissions.len());
        for permission in permissions {
            ensure_known(&permission)?;
            if !deduped.contains(&permission) {
                deduped.push(permission);
            }
        }

        let id = self.get(lookup)?.id;
        let mut replacement = Some(deduped);
        let role = self.modify(id, &mut |permissions| {
            if let Some(next) = replacement.take() {
                *permissions = next;
            }
        })?;
        tracing::info!(role = %role.slug, count = role.permissions.len(), "permissions replaced");
        Ok(role)
    }

    fn modify(
        &self,
        id: RoleId,
        change: &mut dyn FnMut(&mut Vec<Permission>),
    ) -> Result<RoleRecord, RoleAdminError> {
        self.repo.modify_permissions(id, change).map_err(|e| match e {
            StoreError::NotFound => RoleAdminError::RoleNotFound,
            other => RoleAdminError::Store(other),
        })
    }
}

impl core::fmt::Debug for RoleAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RoleAdmin").finish_non_exhaustive()
    }
}

fn ensure_known(permission: &Permission) -> Result<(), RoleAdminError> {
    if permission.is_known() {
        Ok(())
    } else {
        Err(RoleAdminError::UnknownPermission(permission.clone()))
    }
}
