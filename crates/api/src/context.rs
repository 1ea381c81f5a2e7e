use invsys_auth::{Identity, Role};
use invsys_core::UserId;
use uuid::Uuid;

/// Authenticated identity for a request.
///
/// Inserted into request extensions by the authentication middleware only;
/// nothing a client sends can populate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    identity: Identity,
}

impl PrincipalContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> UserId {
        self.identity.user_id()
    }

    /// Role as claimed in the token. Authorization re-reads the stored role.
    pub fn claimed_role(&self) -> &Role {
        self.identity.role()
    }
}

/// Per-request correlation id (uuid v7), also echoed as `x-request-id`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}
