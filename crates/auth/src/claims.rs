use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use invsys_core::UserId;

use crate::Role;
use crate::token::TokenError;

/// Issuer stamped into (and required from) every token.
pub const ISSUER: &str = "inventory-system";

/// Identity claims carried inside a signed token.
///
/// Timestamps travel as whole seconds (`iat`/`exp`), so they are truncated on
/// construction and a decoded token compares equal to the claims it was
/// issued from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,

    pub role: Role,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,

    #[serde(rename = "iss")]
    pub issuer: String,
}

impl Claims {
    /// Fails with [`TokenError::Config`] when `now + ttl` leaves the
    /// representable date range.
    pub fn new(user_id: UserId, role: Role, now: DateTime<Utc>, ttl: Duration) -> Result<Self, TokenError> {
        let issued_at = now.trunc_subsecs(0);
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Config(format!("token ttl of {}s overflows the expiry timestamp", ttl.num_seconds())))?;

        Ok(Self {
            user_id,
            role,
            issued_at,
            expires_at,
            issuer: ISSUER.to_string(),
        })
    }
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature and algorithm checks happen in [`crate::TokenCodec`] before this
/// runs.
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenError::NotYetValid);
    }
    if now > claims.expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_at(now: DateTime<Utc>) -> Claims {
        Claims::new(UserId::new(1), Role::new("clerk"), now, Duration::hours(24)).unwrap()
    }

    #[test]
    fn valid_inside_window() {
        let now = Utc::now();
        let claims = claims_at(now);
        assert_eq!(validate_claims(&claims, now), Ok(()));
        assert_eq!(validate_claims(&claims, claims.expires_at), Ok(()));
    }

    #[test]
    fn expired_after_window() {
        let now = Utc::now();
        let claims = claims_at(now);
        let later = claims.expires_at + Duration::seconds(1);
        assert_eq!(validate_claims(&claims, later), Err(TokenError::Expired));
    }

    #[test]
    fn not_yet_valid_before_issue() {
        let now = Utc::now();
        let claims = claims_at(now);
        let earlier = claims.issued_at - Duration::seconds(5);
        assert_eq!(validate_claims(&claims, earlier), Err(TokenError::NotYetValid));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let claims = Claims::new(UserId::new(1), Role::new("clerk"), now, Duration::seconds(-10)).unwrap();
        assert_eq!(validate_claims(&claims, now), Err(TokenError::InvalidTimeWindow));
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let err = Claims::new(UserId::new(1), Role::new("clerk"), Utc::now(), Duration::days(1_000_000_000))
            .unwrap_err();
        assert!(matches!(err, TokenError::Config(_)));
    }

    #[test]
    fn wire_shape_uses_numeric_timestamps() {
        let claims = claims_at(Utc::now());
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["user_id"], 1);
        assert_eq!(json["role"], "clerk");
        assert_eq!(json["iss"], ISSUER);
        assert_eq!(json["iat"].as_i64(), Some(claims.issued_at.timestamp()));
        assert_eq!(json["exp"].as_i64(), Some(claims.expires_at.timestamp()));
    }
}
