use serde::Serialize;

use invsys_core::UserId;

use crate::{Claims, Role};

/// Identity of an authenticated caller, as established from a verified token.
///
/// Fields are private and there are no setters: once Authentication has
/// produced an `Identity` for a request, nothing downstream can alter it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    user_id: UserId,
    role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Role slug claimed in the token. Authorization re-reads the user's
    /// current role from the store instead of trusting this.
    pub fn role(&self) -> &Role {
        &self.role
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
        }
    }
}
