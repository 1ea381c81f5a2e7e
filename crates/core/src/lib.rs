//! `invsys-core` — shared primitives for the inventory system backend.
//!
//! Identifiers, lookup keys and error types used by both the auth core and
//! the storage adapters. No infrastructure concerns live here.

pub mod entity;
pub mod error;
pub mod id;
pub mod lookup;

pub use entity::Entity;
pub use error::{DomainError, StoreError};
pub use id::{RoleId, UserId};
pub use lookup::{RoleLookup, UserLookup};
