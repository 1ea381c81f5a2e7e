//! Login and credential changes: the only place identity claims are minted.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use invsys_core::{StoreError, UserId, UserLookup};

use crate::password::{PasswordError, PasswordHash, PasswordHasher};
use crate::token::{TokenCodec, TokenError};
use crate::user::{UserStore, UserSummary};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// Unknown user, wrong password and inactive account all map here so the
    /// response never reveals which factor failed.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("user not found")]
    UserNotFound,

    #[error("user store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Hashed on first use and verified against when no account matches, so a
/// miss costs the same bcrypt work as a wrong password.
const DECOY_PASSWORD: &str = "decoy-password-never-assigned";

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserSummary,
}

pub struct LoginService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenCodec>,
    decoy: OnceLock<Option<PasswordHash>>,
}

impl LoginService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: Arc<TokenCodec>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            decoy: OnceLock::new(),
        }
    }

    pub fn hasher(&self) -> PasswordHasher {
        self.hasher
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, LoginError> {
        self.login_at(username, password, Utc::now())
    }

    pub fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, LoginError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LoginError::InvalidCredentials);
        }

        let record = self
            .users
            .find(&UserLookup::ByUsername(username.to_string()))?
            .filter(|record| record.active);

        let Some(record) = record else {
            self.burn_verification(password);
            tracing::info!("login rejected: no active account");
            return Err(LoginError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &record.password_hash) {
            tracing::info!(user_id = %record.id, "login rejected: credential mismatch");
            return Err(LoginError::InvalidCredentials);
        }

        let token = self.tokens.issue_at(record.id, record.role.clone(), now)?;
        tracing::info!(user_id = %record.id, role = %record.role, "login succeeded");

        Ok(LoginOutcome {
            token,
            user: record.summary(),
        })
    }

    fn burn_verification(&self, password: &str) {
        let decoy = self
            .decoy
            .get_or_init(|| self.hasher.hash(DECOY_PASSWORD).ok());
        if let Some(decoy) = decoy {
            let _ = self.hasher.verify(password, decoy);
        }
    }

    /// Hash `new_password` and store it for `user_id`.
    pub fn change_password(&self, user_id: UserId, new_password: &str) -> Result<(), LoginError> {
        let hash = self.hasher.hash(new_password)?;

        match self.users.update_password_hash(user_id, hash) {
            Ok(()) => {
                tracing::info!(%user_id, "password changed");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(LoginError::UserNotFound),
            Err(e) => Err(LoginError::Store(e)),
        }
    }
}

impl core::fmt::Debug for LoginService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginService")
            .field("hasher", &self.hasher)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
