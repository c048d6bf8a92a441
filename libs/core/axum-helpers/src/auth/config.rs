//! Token signing configuration, loaded once at startup.

use core_config::{ConfigError, FromEnv, env_optional, env_required};
use std::time::Duration;

pub const MIN_SECRET_LEN: usize = 32;
pub const DEFAULT_EXPIRES_IN: &str = "7d";
/// Longest accepted token lifetime (one year)
pub const MAX_EXPIRES_IN: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Loaded from:
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_EXPIRES_IN` (optional, `<n>[s|m|h|d|w]` or bare seconds, default `7d`)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expires_in: Duration) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least {MIN_SECRET_LEN} characters (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }
        if expires_in.is_zero() {
            return Err(ConfigError::ParseError {
                key: "JWT_EXPIRES_IN".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }
        if expires_in > MAX_EXPIRES_IN {
            return Err(ConfigError::ParseError {
                key: "JWT_EXPIRES_IN".to_string(),
                details: format!(
                    "must be at most {} days",
                    MAX_EXPIRES_IN.as_secs() / (24 * 60 * 60)
                ),
            });
        }

        Ok(Self { secret, expires_in })
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        let raw = env_optional("JWT_EXPIRES_IN").unwrap_or_else(|| DEFAULT_EXPIRES_IN.to_string());
        let expires_in = parse_expires_in(&raw).ok_or_else(|| ConfigError::ParseError {
            key: "JWT_EXPIRES_IN".to_string(),
            details: format!("expected <n>[s|m|h|d|w], got '{raw}'"),
        })?;

        Self::new(secret, expires_in)
    }
}

/// Parse `30s`, `15m`, `12h`, `7d`, `2w` or a bare number of seconds.
pub fn parse_expires_in(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let amount: u64 = digits.parse().ok()?;

    let seconds_per_unit = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        _ => return None,
    };

    amount.checked_mul(seconds_per_unit).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn test_parse_expires_in_units() {
        assert_eq!(parse_expires_in("90"), Some(Duration::from_secs(90)));
        assert_eq!(parse_expires_in("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_expires_in("15m"), Some(Duration::from_secs(900)));
        assert_eq!(parse_expires_in("12h"), Some(Duration::from_secs(43_200)));
        assert_eq!(parse_expires_in("7d"), Some(Duration::from_secs(604_800)));
        assert_eq!(parse_expires_in("2w"), Some(Duration::from_secs(1_209_600)));
    }

    #[test]
    fn test_parse_expires_in_rejects_garbage() {
        assert_eq!(parse_expires_in(""), None);
        assert_eq!(parse_expires_in("d"), None);
        assert_eq!(parse_expires_in("7 days"), None);
        assert_eq!(parse_expires_in("-5m"), None);
    }

    #[test]
    fn test_jwt_config_new_too_short() {
        let err = JwtConfig::new("short", Duration::from_secs(60)).unwrap_err();
        assert!(err.to_string().contains("32 characters"));
    }

    #[test]
    fn test_jwt_config_new_zero_expiry() {
        let err = JwtConfig::new(SECRET, Duration::ZERO).unwrap_err();
        assert!(err.to_string().contains("JWT_EXPIRES_IN"));
    }

    #[test]
    fn test_jwt_config_new_rejects_huge_expiry() {
        let huge = Duration::from_secs(52_000_000 * 7 * 24 * 60 * 60);
        let err = JwtConfig::new(SECRET, huge).unwrap_err();
        assert!(err.to_string().contains("JWT_EXPIRES_IN"));

        assert!(JwtConfig::new(SECRET, MAX_EXPIRES_IN).is_ok());
    }

    #[test]
    fn test_jwt_config_from_env_defaults_to_seven_days() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("JWT_EXPIRES_IN", None)],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, SECRET);
                assert_eq!(config.expires_in, Duration::from_secs(7 * 24 * 60 * 60));
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_custom_expiry() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("JWT_EXPIRES_IN", Some("1h"))],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.expires_in, Duration::from_secs(3600));
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_bad_expiry() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("JWT_EXPIRES_IN", Some("soon"))],
            || {
                let err = JwtConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("JWT_EXPIRES_IN"));
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_rejects_huge_expiry() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("JWT_EXPIRES_IN", Some("52000000w"))],
            || {
                let err = JwtConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("JWT_EXPIRES_IN"));
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_missing() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_jwt_config_from_env_too_short() {
        temp_env::with_var("JWT_SECRET", Some("short"), || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("32 characters"));
        });
    }
}
