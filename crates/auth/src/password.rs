//! One-way salted password hashing (bcrypt).

use thiserror::Error;

/// Shortest password accepted for hashing, in bytes.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Longest password accepted, in bytes. bcrypt ignores everything past this,
/// so longer input is refused instead of silently truncated.
pub const MAX_PASSWORD_LEN: usize = 72;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must be at least {min} bytes long")]
    WeakInput { min: usize },

    #[error("password must be at most {max} bytes long")]
    TooLong { max: usize },

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// A stored password hash in modular crypt format (`$2b$<cost>$...`).
///
/// The value is redacted from `Debug` output and has no `Serialize` impl, so
/// it cannot leak through logs or response bodies.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash previously produced by [`PasswordHasher::hash`] and read
    /// back from storage.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Hashes and verifies passwords with an embedded cost factor and a fresh
/// random salt per call.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, raw_password: &str) -> Result<PasswordHash, PasswordError> {
        if raw_password.len() < MIN_PASSWORD_LEN {
            return Err(PasswordError::WeakInput {
                min: MIN_PASSWORD_LEN,
            });
        }
        if raw_password.len() > MAX_PASSWORD_LEN {
            return Err(PasswordError::TooLong {
                max: MAX_PASSWORD_LEN,
            });
        }

        bcrypt::hash(raw_password, self.cost)
            .map(PasswordHash)
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    pub fn verify(&self, raw_password: &str, hash: &PasswordHash) -> bool {
        verify_password(raw_password, hash)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

/// Check `raw_password` against `hash`.
///
/// Malformed hashes and over-long passwords verify as `false`; the digest
/// comparison inside bcrypt is constant-time.
pub fn verify_password(raw_password: &str, hash: &PasswordHash) -> bool {
    if raw_password.len() > MAX_PASSWORD_LEN {
        return false;
    }
    bcrypt::verify(raw_password, hash.as_str()).unwrap_or(false)
}
