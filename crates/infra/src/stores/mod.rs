//! In-memory user and role stores.
//!
//! These stand in for the persistent stores the auth core consumes through
//! [`UserStore`] and [`RoleStore`]; the SQL-backed equivalents live with the
//! entity services, outside this workspace.

mod table;

use std::sync::atomic::{AtomicI64, Ordering};

use invsys_auth::{CredentialRecord, PasswordHash, Permission, Role, RoleRecord, RoleStore, UserStore};
use invsys_core::{DomainError, RoleId, RoleLookup, StoreError, UserId, UserLookup};

pub use table::RecordTable;

/// Role store with lookup and permission updates (used by role administration).
pub trait RoleRepository: RoleStore {
    fn find(&self, lookup: &RoleLookup) -> Result<Option<RoleRecord>, StoreError>;

    /// Edit the permission list of role `id` in place and return the updated
    /// record. The read and the write happen as one step, so concurrent edits
    /// to the same role never overwrite each other.
    fn modify_permissions(
        &self,
        id: RoleId,
        change: &mut dyn FnMut(&mut Vec<Permission>),
    ) -> Result<RoleRecord, StoreError>;
}

/// Input for creating a user record.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub active: bool,
}

/// Input for creating a role record.
#[derive(Debug, Clone)]
pub struct NewRole {
    pub slug: Role,
    pub name: String,
    pub permissions: Vec<Permission>,
}

#[derive(Debug)]
pub struct InMemoryUserStore {
    table: RecordTable<CredentialRecord>,
    next_id: AtomicI64,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            table: RecordTable::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Create a user; usernames are unique.
    pub fn insert(&self, user: NewUser) -> Result<UserId, StoreError> {
        let username = user.username.trim().to_string();
        if username.is_empty() {
            return Err(DomainError::validation("username cannot be empty").into());
        }

        let record = CredentialRecord {
            id: UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
            username: username.clone(),
            display_name: user.display_name,
            password_hash: user.password_hash,
            role: user.role,
            active: user.active,
        };

        self.table
            .insert_unique(record, |existing| existing.username == username)?
            .ok_or_else(|| DomainError::conflict(format!("username '{username}' already exists")).into())
    }

    pub fn set_active(&self, id: UserId, active: bool) -> Result<(), StoreError> {
        self.table.update(id, |record| record.active = active).map(drop)
    }

    pub fn set_role(&self, id: UserId, role: Role) -> Result<(), StoreError> {
        self.table.update(id, |record| record.role = role).map(drop)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        self.table.len()
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for InMemoryUserStore {
    fn find(&self, lookup: &UserLookup) -> Result<Option<CredentialRecord>, StoreError> {
        match lookup {
            UserLookup::ById(id) => self.table.get(*id),
            UserLookup::ByUsername(name) => self.table.find(|record| &record.username == name),
        }
    }

    fn update_password_hash(&self, id: UserId, hash: PasswordHash) -> Result<(), StoreError> {
        self.table.update(id, |record| record.password_hash = hash).map(drop)
    }
}

#[derive(Debug)]
pub struct InMemoryRoleStore {
    table: RecordTable<RoleRecord>,
    next_id: AtomicI64,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self {
            table: RecordTable::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Create a role; slugs are unique and slug/name must be non-empty.
    pub fn insert(&self, role: NewRole) -> Result<RoleId, StoreError> {
        if role.slug.as_str().trim().is_empty() || role.name.trim().is_empty() {
            return Err(DomainError::validation("role slug and name are required").into());
        }

        let slug = role.slug.clone();
        let record = RoleRecord {
            id: RoleId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
            slug: role.slug,
            name: role.name,
            permissions: role.permissions,
        };

        self.table
            .insert_unique(record, |existing| existing.slug == slug)?
            .ok_or_else(|| DomainError::conflict(format!("role slug '{slug}' already exists")).into())
    }
}

impl Default for InMemoryRoleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleStore for InMemoryRoleStore {
    fn list_roles(&self) -> Result<Vec<RoleRecord>, StoreError> {
        let mut roles = self.table.list()?;
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }
}

impl RoleRepository for InMemoryRoleStore {
    fn find(&self, lookup: &RoleLookup) -> Result<Option<RoleRecord>, StoreError> {
        match lookup {
            RoleLookup::ById(id) => self.table.get(*id),
            RoleLookup::BySlug(slug) => self.table.find(|record| record.slug.as_str() == slug),
        }
    }

    fn modify_permissions(
        &self,
        id: RoleId,
        change: &mut dyn FnMut(&mut Vec<Permission>),
    ) -> Result<RoleRecord, StoreError> {
        self.table.update(id, |record| change(&mut record.permissions))
    }
}

#[cfg(test)]
mod tests {
    use invsys_auth::catalog;

    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            display_name: name.to_string(),
            password_hash: PasswordHash::from_stored("opaque"),
            role: Role::new("clerk"),
            active: true,
        }
    }

    #[test]
    fn users_are_found_by_id_and_username() {
        let store = InMemoryUserStore::new();
        let id = store.insert(new_user("alice")).unwrap();

        let by_id = store.find(&UserLookup::ById(id)).unwrap().unwrap();
        let by_name = store.find(&UserLookup::ByUsername("alice".into())).unwrap().unwrap();
        assert_eq!(by_id, by_name);
        assert!(store.find(&UserLookup::ByUsername("bob".into())).unwrap().is_none());
    }

    #[test]
    fn duplicate_username_conflicts() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("alice")).unwrap();
        let err = store.insert(new_user("alice")).unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn password_update_for_missing_user_is_not_found() {
        let store = InMemoryUserStore::new();
        let err = store
            .update_password_hash(UserId::new(9), PasswordHash::from_stored("x"))
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }

    #[test]
    fn roles_list_sorted_by_name() {
        let store = InMemoryRoleStore::new();
        for (slug, name) in [("mgr", "Manager"), ("adm", "Administrator"), ("clk", "Clerk")] {
            store
                .insert(NewRole {
                    slug: Role::new(slug),
                    name: name.to_string(),
                    permissions: vec![],
                })
                .unwrap();
        }
        let names: Vec<String> = store.list_roles().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Administrator", "Clerk", "Manager"]);
    }

    #[test]
    fn role_lookup_and_update() {
        let store = InMemoryRoleStore::new();
        let id = store
            .insert(NewRole {
                slug: Role::new("clerk"),
                name: "Clerk".into(),
                permissions: vec![catalog::ORDER_READ],
            })
            .unwrap();

        let updated = store
            .modify_permissions(id, &mut |permissions| *permissions = vec![catalog::ORDER_ALL])
            .unwrap();
        assert_eq!(updated.permissions, vec![catalog::ORDER_ALL]);
        let by_slug = store.find(&RoleLookup::BySlug("clerk".into())).unwrap().unwrap();
        assert_eq!(by_slug.id, id);
        assert_eq!(by_slug.permissions, vec![catalog::ORDER_ALL]);
    }

    #[test]
    fn modifying_a_missing_role_is_not_found() {
        let store = InMemoryRoleStore::new();
        let err = store.modify_permissions(RoleId::new(7), &mut |_| {}).unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }

    #[test]
    fn role_requires_slug_and_name() {
        let store = InMemoryRoleStore::new();
        let err = store
            .insert(NewRole {
                slug: Role::new(""),
                name: "Nameless".into(),
                permissions: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
    }
}
