//! Signed, time-bound bearer tokens (JWT, HS256 only).

use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;
use thiserror::Error;

use invsys_core::UserId;

use crate::claims::{Claims, ISSUER, validate_claims};
use crate::Role;

/// Lifetime of an issued token unless configured otherwise.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest lifetime a codec accepts (one year).
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

/// The one signing algorithm this codec issues and accepts.
pub const ACCEPTED_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("token declares unaccepted algorithm '{0}'")]
    AlgorithmMismatch(String),

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token issuer is invalid")]
    InvalidIssuer,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("failed to encode token: {0}")]
    Encoding(String),

    #[error("invalid token configuration: {0}")]
    Config(String),
}

/// Issues and verifies tokens with the process-wide signing secret.
///
/// Built once at startup and shared read-only; rotating the secret means
/// building a new codec, which invalidates every token issued by the old one.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::Config("signing secret is empty".to_string()));
        }
        if secret.len() < 32 {
            tracing::warn!("token signing secret is shorter than recommended (32 bytes)");
        }

        if ttl > MAX_TOKEN_TTL {
            return Err(TokenError::Config(format!(
                "token ttl must not exceed {}s",
                MAX_TOKEN_TTL.as_secs()
            )));
        }

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| TokenError::Config(format!("token ttl out of range: {e}")))?;
        if ttl <= chrono::Duration::zero() {
            return Err(TokenError::Config("token ttl must be positive".to_string()));
        }

        // Expiry is checked by `validate_claims` against an explicit clock.
        let mut validation = Validation::new(ACCEPTED_ALGORITHM);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Issue a token for `user_id` acting as `role`, valid from now for the
    /// configured TTL.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        self.issue_at(user_id, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, role, now, self.ttl)?;
        encode(&Header::new(ACCEPTED_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as of `now` and return its claims unchanged.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let declared = declared_algorithm(token)?;
        if declared != "HS256" {
            return Err(TokenError::AlgorithmMismatch(declared));
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| map_jwt_error(e.kind()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ACCEPTED_ALGORITHM)
            .field("issuer", &ISSUER)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish()
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Read the `alg` a token declares without trusting anything else in it.
///
/// Done by hand so that names `jsonwebtoken` cannot represent (e.g. `none`)
/// still surface as an algorithm mismatch rather than a parse failure.
fn declared_algorithm(token: &str) -> Result<String, TokenError> {
    let mut segments = token.split('.');
    let header = segments.next().ok_or(TokenError::Malformed)?;
    if segments.count() != 2 {
        return Err(TokenError::Malformed);
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::Malformed)?;
    let header: RawHeader = serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;
    Ok(header.alg)
}

fn map_jwt_error(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
        ErrorKind::InvalidAlgorithm => TokenError::AlgorithmMismatch("unknown".to_string()),
        ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}
