use thiserror::Error;

use crate::{Permission, PolicyMap, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),
}

/// Find the grant in `role`'s policy entry that satisfies `required`.
///
/// - No IO
/// - No panics
/// - Undefined roles match nothing (deny-by-default)
pub fn matching_grant<'a>(
    role: &Role,
    policy: &'a PolicyMap,
    required: &Permission,
) -> Option<&'a Permission> {
    let granted = policy.permissions_for(role)?;

    if let Some(exact) = granted.get(required) {
        return Some(exact);
    }

    granted
        .iter()
        .find(|grant| grant.is_wildcard() && grant.grants(required))
}

/// Decide whether `role` may perform `required` under `policy`.
pub fn is_authorized(role: &Role, policy: &PolicyMap, required: &Permission) -> bool {
    matching_grant(role, policy, required).is_some()
}

/// [`is_authorized`] as a `Result`, naming the denied permission.
pub fn authorize(role: &Role, policy: &PolicyMap, required: &Permission) -> Result<(), AuthzError> {
    match matching_grant(role, policy, required) {
        Some(grant) => {
            tracing::trace!(%role, %required, %grant, "permission granted");
            Ok(())
        }
        None => Err(AuthzError::Forbidden(required.clone())),
    }
}
