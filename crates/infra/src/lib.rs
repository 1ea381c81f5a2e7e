//! Infrastructure adapters for the auth core: in-memory user and role stores
//! (dev/tests), role-permission administration and bootstrap seeding.

pub mod role_admin;
pub mod seed;
pub mod stores;

pub use role_admin::{RoleAdmin, RoleAdminError};
pub use seed::{ADMIN_ROLE, SeedError, seed_admin};
pub use stores::{InMemoryRoleStore, InMemoryUserStore, NewRole, NewUser, RoleRepository};
