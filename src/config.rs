use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

const DEV_SECRET_KEY: &str = "insecure-development-secret-change-me";

// Longest accepted token and reset-link lifetimes
const MAX_TOKEN_DAYS: i64 = 36_500;
const MAX_RESET_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub secret_key: String,
    pub access_token_days: i64,
    pub refresh_token_days: i64,
    pub password_reset_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub from_address: String,
    /// Base URL of the web client, used to build password reset links
    pub frontend_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Google sign-in is disabled when unset
    pub client_id: Option<String>,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup so it can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database: DatabaseConfig {
                url: var("DATABASE_URL", "sqlite:data/social_feed.db"),
                max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            },
            server: ServerConfig {
                host: var("SERVER_HOST", "0.0.0.0"),
                port: parse_var(&lookup, "SERVER_PORT", 8000)?,
            },
            auth: AuthConfig {
                secret_key: var("SECRET_KEY", DEV_SECRET_KEY),
                access_token_days: parse_bounded(&lookup, "JWT_EXPIRATION_DAYS", 7, MAX_TOKEN_DAYS)?,
                refresh_token_days: parse_bounded(
                    &lookup,
                    "JWT_REFRESH_EXPIRATION_DAYS",
                    30,
                    MAX_TOKEN_DAYS,
                )?,
                password_reset_hours: parse_bounded(
                    &lookup,
                    "PASSWORD_RESET_TIMEOUT_HOURS",
                    24,
                    MAX_RESET_HOURS,
                )?,
            },
            email: EmailConfig {
                from_address: var("DEFAULT_FROM_EMAIL", "noreply@example.com"),
                frontend_url: var("FRONTEND_URL", "http://localhost:5173"),
            },
            google: GoogleConfig {
                client_id: lookup("GOOGLE_CLIENT_ID").filter(|id| !id.trim().is_empty()),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn uses_development_secret(&self) -> bool {
        self.auth.secret_key == DEV_SECRET_KEY
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::Configuration(format!("{} must be a number, got {:?}", key, raw))
        }),
        None => Ok(default),
    }
}

/// A positive integer no larger than `max`
fn parse_bounded<F>(lookup: &F, key: &str, default: i64, max: i64) -> AppResult<i64>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_var(lookup, key, default)?;
    if !(1..=max).contains(&value) {
        return Err(AppError::Configuration(format!(
            "{} must be between 1 and {}, got {}",
            key, max, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppResult<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database.url, "sqlite:data/social_feed.db");
        assert_eq!(config.server_address(), "0.0.0.0:8000");
        assert_eq!(config.auth.access_token_days, 7);
        assert_eq!(config.auth.refresh_token_days, 30);
        assert_eq!(config.auth.password_reset_hours, 24);
        assert!(config.google.client_id.is_none());
        assert!(config.uses_development_secret());
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("SERVER_PORT", "9090"),
            ("SECRET_KEY", "s3cret"),
            ("GOOGLE_CLIENT_ID", "client.apps.googleusercontent.com"),
            ("FRONTEND_URL", "https://feed.example.com"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert!(!config.uses_development_secret());
        assert_eq!(
            config.google.client_id.as_deref(),
            Some("client.apps.googleusercontent.com")
        );
        assert_eq!(config.email.frontend_url, "https://feed.example.com");
    }

    #[test]
    fn blank_google_client_id_disables_sign_in() {
        let config = config_from(&[("GOOGLE_CLIENT_ID", "  ")]).unwrap();
        assert!(config.google.client_id.is_none());
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = config_from(&[("SERVER_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn out_of_range_lifetimes_are_rejected() {
        for (key, value) in [
            ("JWT_EXPIRATION_DAYS", "99999999999999"),
            ("JWT_REFRESH_EXPIRATION_DAYS", "0"),
            ("PASSWORD_RESET_TIMEOUT_HOURS", "-1"),
        ] {
            let err = config_from(&[(key, value)]).unwrap_err();
            assert!(matches!(err, AppError::Configuration(_)), "{}={}", key, value);
        }

        let config = config_from(&[("JWT_EXPIRATION_DAYS", "36500")]).unwrap();
        assert_eq!(config.auth.access_token_days, 36_500);
    }
}
