//! Request-pipeline decisions, independent of any HTTP framework.
//!
//! Authentication turns an `Authorization` header value into an [`Identity`];
//! Authorization turns that identity plus a required permission into
//! allow/deny. Transport layers only map [`AccessError`] onto responses.

use chrono::{DateTime, Utc};
use thiserror::Error;

use invsys_core::UserLookup;

use crate::authorize::matching_grant;
use crate::policy::PolicyResolver;
use crate::token::TokenCodec;
use crate::user::UserStore;
use crate::{Identity, Permission};

pub const BEARER_SCHEME: &str = "Bearer";

/// Why a request was not authenticated. Kept for logs only; clients always
/// see the same 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unauthenticated {
    MissingHeader,
    MalformedHeader,
    InvalidToken,
    MissingIdentity,
    UnknownUser,
}

impl Unauthenticated {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unauthenticated::MissingHeader => "missing_header",
            Unauthenticated::MalformedHeader => "malformed_header",
            Unauthenticated::InvalidToken => "invalid_token",
            Unauthenticated::MissingIdentity => "missing_identity",
            Unauthenticated::UnknownUser => "unknown_user",
        }
    }
}

impl core::fmt::Display for Unauthenticated {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("unauthenticated ({0})")]
    Unauthenticated(Unauthenticated),

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Extract the token from a header of the exact shape `Bearer <token>`.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AccessError> {
    let header = header.ok_or(AccessError::Unauthenticated(Unauthenticated::MissingHeader))?;

    let mut fields = header.split(' ');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AccessError::Unauthenticated(Unauthenticated::MalformedHeader)),
    }
}

/// Authentication stage: header → verified [`Identity`].
pub fn authenticate(
    header: Option<&str>,
    tokens: &TokenCodec,
    now: DateTime<Utc>,
) -> Result<Identity, AccessError> {
    let token = extract_bearer(header).inspect_err(|e| {
        tracing::debug!(error = %e, "authentication rejected");
    })?;

    let claims = tokens.verify_at(token, now).map_err(|e| {
        tracing::debug!(error = %e, "authentication rejected: token verification failed");
        AccessError::Unauthenticated(Unauthenticated::InvalidToken)
    })?;

    Ok(Identity::from(claims))
}

/// Authorization stage: identity + required permission → allow/deny.
///
/// The user's *current* role is read from the store, and the policy is
/// resolved fresh, so role changes take effect without re-login.
pub fn authorize_identity(
    identity: Option<&Identity>,
    users: &dyn UserStore,
    resolver: &PolicyResolver,
    required: &Permission,
) -> Result<(), AccessError> {
    let Some(identity) = identity else {
        tracing::error!(%required, "authorization invoked without an authenticated identity");
        return Err(AccessError::Unauthenticated(Unauthenticated::MissingIdentity));
    };
    let user_id = identity.user_id();

    let user = match users.find(&UserLookup::ById(user_id)) {
        Ok(Some(user)) if user.active => user,
        Ok(_) => {
            tracing::warn!(%user_id, "authorization rejected: user missing or inactive");
            return Err(AccessError::Unauthenticated(Unauthenticated::UnknownUser));
        }
        Err(e) => {
            tracing::error!(%user_id, error = %e, "failed to load user record");
            return Err(AccessError::Internal("failed to load user".to_string()));
        }
    };

    let policy = resolver
        .resolve()
        .map_err(|_| AccessError::Internal("failed to load permissions".to_string()))?;

    match matching_grant(&user.role, &policy, required) {
        Some(grant) => {
            tracing::debug!(%user_id, role = %user.role, %required, %grant, "access granted");
            Ok(())
        }
        None => {
            tracing::warn!(%user_id, role = %user.role, %required, "access denied");
            Err(AccessError::Forbidden(required.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Duration;
    use invsys_core::{RoleId, StoreError, UserId};

    use super::*;
    use crate::password::PasswordHash;
    use crate::permissions::catalog;
    use crate::policy::RoleStore;
    use crate::token::DEFAULT_TOKEN_TTL;
    use crate::user::CredentialRecord;
    use crate::{Role, RoleRecord};

    const SECRET: &str = "guard-test-secret-0123456789abcdef";

    struct Users(Mutex<Vec<CredentialRecord>>);

    impl UserStore for Users {
        fn find(&self, lookup: &UserLookup) -> Result<Option<CredentialRecord>, StoreError> {
            let UserLookup::ById(id) = lookup else {
                return Ok(None);
            };
            Ok(self.0.lock().unwrap().iter().find(|u| u.id == *id).cloned())
        }

        fn update_password_hash(&self, _id: UserId, _hash: PasswordHash) -> Result<(), StoreError> {
            Ok(())
        }
    }

    struct Roles(Result<Vec<RoleRecord>, StoreError>);

    impl RoleStore for Roles {
        fn list_roles(&self) -> Result<Vec<RoleRecord>, StoreError> {
            self.0.clone()
        }
    }

    fn clerk(id: i64, active: bool) -> CredentialRecord {
        CredentialRecord {
            id: UserId::new(id),
            username: format!("user{id}"),
            display_name: String::new(),
            password_hash: PasswordHash::from_stored("unused"),
            role: Role::new("clerk"),
            active,
        }
    }

    fn users() -> Users {
        Users(Mutex::new(vec![clerk(1, true), clerk(2, false)]))
    }

    fn clerk_policy() -> PolicyResolver {
        PolicyResolver::new(Arc::new(Roles(Ok(vec![RoleRecord {
            id: RoleId::new(1),
            slug: Role::new("clerk"),
            name: "Clerk".to_string(),
            permissions: vec![catalog::ORDER_CREATE, catalog::ORDER_READ],
        }]))))
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, DEFAULT_TOKEN_TTL).unwrap()
    }

    fn unauthenticated(reason: Unauthenticated) -> AccessError {
        AccessError::Unauthenticated(reason)
    }

    #[test]
    fn bearer_header_shape_is_strict() {
        assert_eq!(extract_bearer(Some("Bearer abc")), Ok("abc"));
        assert_eq!(extract_bearer(None), Err(unauthenticated(Unauthenticated::MissingHeader)));

        for bad in ["", "Bearer", "Bearer ", "bearer abc", "Basic abc", "Bearer a b", "Bearer  abc", "abc"] {
            assert_eq!(
                extract_bearer(Some(bad)),
                Err(unauthenticated(Unauthenticated::MalformedHeader)),
                "header {bad:?}"
            );
        }
    }

    #[test]
    fn authenticate_yields_identity() {
        let codec = codec();
        let token = codec.issue(UserId::new(1), Role::new("clerk")).unwrap();
        let header = format!("Bearer {token}");

        let identity = authenticate(Some(&header), &codec, Utc::now()).unwrap();
        assert_eq!(identity.user_id(), UserId::new(1));
        assert_eq!(identity.role(), &Role::new("clerk"));
    }

    #[test]
    fn authenticate_rejects_bad_tokens() {
        let codec = codec();
        let now = Utc::now();
        let token = codec.issue_at(UserId::new(1), Role::new("clerk"), now).unwrap();
        let header = format!("Bearer {token}");

        let expired = authenticate(Some(&header), &codec, now + Duration::days(2));
        assert_eq!(expired, Err(unauthenticated(Unauthenticated::InvalidToken)));

        let garbage = authenticate(Some("Bearer not.a.token"), &codec, now);
        assert_eq!(garbage, Err(unauthenticated(Unauthenticated::InvalidToken)));
    }

    #[test]
    fn missing_identity_is_unauthenticated() {
        let err = authorize_identity(None, &users(), &clerk_policy(), &catalog::ORDER_READ).unwrap_err();
        assert_eq!(err, unauthenticated(Unauthenticated::MissingIdentity));
    }

    #[test]
    fn unknown_or_inactive_user_is_unauthenticated() {
        let ghost = Identity::new(UserId::new(404), Role::new("clerk"));
        let err = authorize_identity(Some(&ghost), &users(), &clerk_policy(), &catalog::ORDER_READ).unwrap_err();
        assert_eq!(err, unauthenticated(Unauthenticated::UnknownUser));

        let inactive = Identity::new(UserId::new(2), Role::new("clerk"));
        let err = authorize_identity(Some(&inactive), &users(), &clerk_policy(), &catalog::ORDER_READ).unwrap_err();
        assert_eq!(err, unauthenticated(Unauthenticated::UnknownUser));
    }

    #[test]
    fn grants_and_denies_by_policy() {
        let me = Identity::new(UserId::new(1), Role::new("clerk"));
        assert_eq!(authorize_identity(Some(&me), &users(), &clerk_policy(), &catalog::ORDER_READ), Ok(()));
        assert_eq!(
            authorize_identity(Some(&me), &users(), &clerk_policy(), &catalog::ORDER_DELETE),
            Err(AccessError::Forbidden(catalog::ORDER_DELETE))
        );
    }

    #[test]
    fn role_claim_in_token_is_not_trusted() {
        // Token claims "admin", but the stored record says "clerk".
        let me = Identity::new(UserId::new(1), Role::new("admin"));
        let err = authorize_identity(Some(&me), &users(), &clerk_policy(), &catalog::ORDER_DELETE).unwrap_err();
        assert_eq!(err, AccessError::Forbidden(catalog::ORDER_DELETE));
    }

    #[test]
    fn policy_failure_is_internal_not_permissive() {
        let me = Identity::new(UserId::new(1), Role::new("clerk"));
        let broken = PolicyResolver::new(Arc::new(Roles(Err(StoreError::unavailable("down")))));
        let err = authorize_identity(Some(&me), &users(), &broken, &catalog::ORDER_READ).unwrap_err();
        assert!(matches!(err, AccessError::Internal(_)));
    }
}
