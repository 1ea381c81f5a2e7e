//! Role → permission policy, resolved fresh from the role store.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;

use invsys_core::StoreError;

use crate::{Permission, Role, RoleRecord};

/// Read access to the persistent role store (external collaborator).
///
/// This is also the seam where a time-boxed cache would sit; none exists
/// today, so every resolution re-reads the store.
pub trait RoleStore: Send + Sync {
    fn list_roles(&self) -> Result<Vec<RoleRecord>, StoreError>;
}

impl<S> RoleStore for Arc<S>
where
    S: RoleStore + ?Sized,
{
    fn list_roles(&self) -> Result<Vec<RoleRecord>, StoreError> {
        (**self).list_roles()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The role store could not be read. Callers must deny, never treat this
    /// as an empty (or permissive) policy.
    #[error("policy unavailable: {0}")]
    Unavailable(#[source] StoreError),
}

/// Mapping from role slug to the set of permissions the role grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyMap {
    grants: HashMap<Role, HashSet<Permission>>,
}

impl PolicyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold role records into a policy. Records sharing a slug are merged.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RoleRecord>,
    {
        let mut policy = Self::new();
        for record in records {
            policy.grant(record.slug, record.permissions);
        }
        policy
    }

    /// Builder-style helper, mostly for tests and seeding.
    pub fn with_role<I, P>(mut self, role: impl Into<Role>, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        self.grant(role.into(), permissions.into_iter().map(Into::into));
        self
    }

    fn grant<I>(&mut self, role: Role, permissions: I)
    where
        I: IntoIterator<Item = Permission>,
    {
        self.grants.entry(role).or_default().extend(permissions);
    }

    /// Permissions granted to `role`, or `None` when the role is undefined.
    pub fn permissions_for(&self, role: &Role) -> Option<&HashSet<Permission>> {
        self.grants.get(role)
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Sorted, serialisable view for display.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<String>> {
        self.grants
            .iter()
            .map(|(role, perms)| {
                let mut perms: Vec<String> = perms.iter().map(|p| p.as_str().to_string()).collect();
                perms.sort();
                (role.as_str().to_string(), perms)
            })
            .collect()
    }
}

/// Produces the current [`PolicyMap`] from the role store.
#[derive(Clone)]
pub struct PolicyResolver {
    store: Arc<dyn RoleStore>,
}

impl PolicyResolver {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    pub fn resolve(&self) -> Result<PolicyMap, PolicyError> {
        let records = self.store.list_roles().map_err(|e| {
            tracing::error!(error = %e, "failed to read role store");
            PolicyError::Unavailable(e)
        })?;

        let policy = PolicyMap::from_records(records);
        tracing::debug!(roles = policy.len(), "resolved policy map");
        Ok(policy)
    }
}

impl core::fmt::Debug for PolicyResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PolicyResolver").finish_non_exhaustive()
    }
}
