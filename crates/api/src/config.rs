//! Runtime configuration, read from the environment once at startup.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use invsys_auth::{DEFAULT_TOKEN_TTL, MAX_TOKEN_TTL};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Only used by debug builds when `JWT_SECRET` is unset.
const DEV_JWT_SECRET: &str = "invsys-dev-secret-do-not-use-in-production";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Credentials for the bootstrap admin account.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminAccount {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub password_hash_cost: u32,
    pub bind_addr: SocketAddr,
    pub admin: Option<AdminAccount>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if secret.is_empty() => {
                return Err(ConfigError::Invalid {
                    key: "JWT_SECRET",
                    reason: "must not be empty".to_string(),
                });
            }
            Some(secret) => secret,
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        let token_ttl = match var("TOKEN_TTL_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 && secs <= MAX_TOKEN_TTL.as_secs() => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "TOKEN_TTL_SECS",
                        reason: format!(
                            "expected between 1 and {} seconds, got '{raw}'",
                            MAX_TOKEN_TTL.as_secs()
                        ),
                    });
                }
            },
            None => DEFAULT_TOKEN_TTL,
        };

        let password_hash_cost = match var("PASSWORD_HASH_COST") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(cost) if (4..=31).contains(&cost) => cost,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "PASSWORD_HASH_COST",
                        reason: format!("expected a bcrypt cost between 4 and 31, got '{raw}'"),
                    });
                }
            },
            None => invsys_auth::PasswordHasher::default().cost(),
        };

        let bind_raw = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.trim().parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            key: "BIND_ADDR",
            reason: e.to_string(),
        })?;

        let admin = match (var("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminAccount { username, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("ADMIN_USERNAME")),
        };

        Ok(Self {
            jwt_secret,
            token_ttl,
            password_hash_cost,
            bind_addr,
            admin,
        })
    }
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("password_hash_cost", &self.password_hash_cost)
            .field("bind_addr", &self.bind_addr)
            .field("admin", &self.admin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.token_ttl, Duration::from_secs(24 * 60 * 60));
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(cfg.password_hash_cost, bcrypt_default_cost());
        assert!(cfg.admin.is_none());
    }

    fn bcrypt_default_cost() -> u32 {
        invsys_auth::PasswordHasher::default().cost()
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            ("JWT_SECRET", "s3cret"),
            ("TOKEN_TTL_SECS", "60"),
            ("PASSWORD_HASH_COST", "5"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("ADMIN_USERNAME", "root"),
            ("ADMIN_PASSWORD", "rootpass"),
        ])
        .unwrap();
        assert_eq!(cfg.token_ttl, Duration::from_secs(60));
        assert_eq!(cfg.password_hash_cost, 5);
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.admin.unwrap().username, "root");
    }

    #[test]
    fn empty_secret_is_rejected() {
        let err = config(&[("JWT_SECRET", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_SECRET", .. }));
    }

    #[test]
    fn bad_values_are_rejected() {
        for (key, value) in [
            ("TOKEN_TTL_SECS", "0"),
            ("TOKEN_TTL_SECS", "soon"),
            ("TOKEN_TTL_SECS", "1000000000000000"),
            ("PASSWORD_HASH_COST", "99"),
            ("BIND_ADDR", "nowhere"),
        ] {
            let err = config(&[("JWT_SECRET", "s3cret"), (key, value)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{key}={value}");
        }
    }

    #[test]
    fn admin_credentials_come_in_pairs() {
        let err = config(&[("JWT_SECRET", "s3cret"), ("ADMIN_USERNAME", "root")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("ADMIN_PASSWORD"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let cfg = config(&[("JWT_SECRET", "s3cret"), ("ADMIN_USERNAME", "root"), ("ADMIN_PASSWORD", "rootpass")]).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("rootpass"));
    }
}
