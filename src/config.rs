//! Application configuration loaded from environment variables.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use time::Duration;
use tower_sessions::cookie::SameSite;

use crate::error::{Error, Result};

/// Longest accepted session lifetime: ten years.
pub const MAX_SESSION_TIMEOUT_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Deployment environment. Drives cookie security attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(Error::Config(format!(
                "APP_ENV must be `development` or `production`, got `{other}`"
            ))),
        }
    }
}

/// Attributes of the session cookie, shared by the HTTP middleware and the
/// socket handshake.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSite,
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database_url: String,
    pub database_ssl: bool,
    pub database_max_connections: u32,
    pub bind_address: String,
    pub secret_key: String,
    pub session_cookie_name: String,
    pub session_key_prefix: String,
    pub session_timeout_secs: i64,
    pub remember_me_timeout_secs: i64,
    pub session_cleanup_interval_secs: u64,
    pub max_page_size: u64,
    pub password_hash_memory_kib: u32,
    pub password_hash_iterations: u32,
    pub log_level: String,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first when present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an explicit key/value map.
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| values.get(key).cloned())
    }

    /// Build and validate a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            environment: get("APP_ENV")
                .as_deref()
                .unwrap_or("development")
                .parse()?,
            database_url: required(&get, "DATABASE_URL")?,
            database_ssl: get("DATABASE_SSL_MODE").map_or(true, |v| v == "true"),
            database_max_connections: parsed(&get, "DATABASE_MAX_CONNECTIONS", 10)?,
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            secret_key: required(&get, "SECRET_KEY")?,
            session_cookie_name: get("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| "portfolio.sid".to_string()),
            session_key_prefix: get("SESSION_KEY_PREFIX").unwrap_or_else(|| "sess".to_string()),
            session_timeout_secs: parsed(&get, "SESSION_TIMEOUT_SECS", 24 * 60 * 60)?,
            remember_me_timeout_secs: parsed(
                &get,
                "REMEMBER_ME_TIMEOUT_SECS",
                30 * 24 * 60 * 60,
            )?,
            session_cleanup_interval_secs: parsed(&get, "SESSION_CLEANUP_INTERVAL_SECS", 3600)?,
            max_page_size: parsed(&get, "MAX_PAGE_SIZE", 25)?,
            password_hash_memory_kib: parsed(
                &get,
                "PASSWORD_HASH_MEMORY_KIB",
                argon2::Params::DEFAULT_M_COST,
            )?,
            password_hash_iterations: parsed(
                &get,
                "PASSWORD_HASH_ITERATIONS",
                argon2::Params::DEFAULT_T_COST,
            )?,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(Error::Config("MAX_PAGE_SIZE must be at least 1".into()));
        }
        if self.session_timeout_secs <= 0 {
            return Err(Error::Config("SESSION_TIMEOUT_SECS must be positive".into()));
        }
        if self.remember_me_timeout_secs > MAX_SESSION_TIMEOUT_SECS {
            return Err(Error::Config(format!(
                "REMEMBER_ME_TIMEOUT_SECS must not exceed {MAX_SESSION_TIMEOUT_SECS}"
            )));
        }
        if self.remember_me_timeout_secs <= self.session_timeout_secs {
            return Err(Error::Config(
                "REMEMBER_ME_TIMEOUT_SECS must be longer than SESSION_TIMEOUT_SECS".into(),
            ));
        }
        if self.session_cleanup_interval_secs == 0 {
            return Err(Error::Config(
                "SESSION_CLEANUP_INTERVAL_SECS must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::seconds(self.session_timeout_secs)
    }

    pub fn remember_me_timeout(&self) -> Duration {
        Duration::seconds(self.remember_me_timeout_secs)
    }

    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings {
            name: self.session_cookie_name.clone(),
            secure: self.is_production(),
            same_site: if self.is_production() {
                SameSite::Strict
            } else {
                SameSite::Lax
            },
        }
    }
}

fn required<G>(get: &G, key: &str) -> Result<String>
where
    G: Fn(&str) -> Option<String>,
{
    get(key).ok_or_else(|| Error::Config(format!("{key} not set")))
}

fn parsed<G, T>(get: &G, key: &str, default: T) -> Result<T>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} has an invalid value: `{raw}`"))),
        None => Ok(default),
    }
}
