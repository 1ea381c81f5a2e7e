//! `invsys-auth` — stateless credential and policy authorization core.
//!
//! This crate is intentionally decoupled from HTTP and storage: stores are
//! reached through the [`UserStore`] and [`RoleStore`] traits, and the HTTP
//! layer only maps [`AccessError`] onto responses.

pub mod authorize;
pub mod claims;
pub mod guard;
pub mod login;
pub mod password;
pub mod permissions;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{AuthzError, authorize, is_authorized, matching_grant};
pub use claims::{Claims, ISSUER, validate_claims};
pub use guard::{AccessError, Unauthenticated, authenticate, authorize_identity};
pub use login::{LoginError, LoginOutcome, LoginService};
pub use password::{MAX_PASSWORD_LEN, MIN_PASSWORD_LEN, PasswordError, PasswordHash, PasswordHasher, verify_password};
pub use permissions::{Permission, all_permissions, catalog};
pub use policy::{PolicyError, PolicyMap, PolicyResolver, RoleStore};
pub use principal::Identity;
pub use roles::{Role, RoleRecord};
pub use token::{DEFAULT_TOKEN_TTL, MAX_TOKEN_TTL, TokenCodec, TokenError};
pub use user::{CredentialRecord, UserStore, UserSummary};
