use chrono::{TimeDelta, Utc};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 15;
const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 7;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 2000;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("expected {0} to have env var set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration loaded from environment variables at start-up
#[derive(Clone)]
pub struct Config {
    pub access_secret: String,
    pub refresh_secret: String,
    pub redis_url: Option<String>,
    pub database_url: Option<String>,
    pub port: u16,
    pub access_token_lifetime: TimeDelta,
    pub refresh_token_lifetime: TimeDelta,
    pub store_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let access_secret = get("ACCESS_SECRET").ok_or(ConfigError::Missing("ACCESS_SECRET"))?;
        let refresh_secret =
            get("REFRESH_SECRET").ok_or(ConfigError::Missing("REFRESH_SECRET"))?;

        Ok(Self {
            access_secret,
            refresh_secret,
            redis_url: get("REDIS_URL"),
            database_url: get("DATABASE_URL"),
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            access_token_lifetime: parse_lifetime(
                "ACCESS_TOKEN_MINUTES",
                get("ACCESS_TOKEN_MINUTES"),
                DEFAULT_ACCESS_TOKEN_MINUTES,
                TimeDelta::try_minutes,
            )?,
            refresh_token_lifetime: parse_lifetime(
                "REFRESH_TOKEN_DAYS",
                get("REFRESH_TOKEN_DAYS"),
                DEFAULT_REFRESH_TOKEN_DAYS,
                TimeDelta::try_days,
            )?,
            store_timeout: Duration::from_millis(parse_or(
                "STORE_TIMEOUT_MS",
                get("STORE_TIMEOUT_MS"),
                DEFAULT_STORE_TIMEOUT_MS,
            )?),
        })
    }
}

// Secrets stay out of logs and panic messages.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("redis_url", &self.redis_url.as_ref().map(|_| "<set>"))
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("port", &self.port)
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn parse_positive(
    name: &'static str,
    raw: Option<String>,
    default: i64,
) -> Result<i64, ConfigError> {
    let value = parse_or(name, raw.clone(), default)?;
    if value <= 0 {
        return Err(ConfigError::Invalid {
            name,
            value: raw.unwrap_or_default(),
        });
    }
    Ok(value)
}

/// Parses a positive count of `unit`s, rejecting lifetimes that would push a
/// token expiry past the representable date range.
fn parse_lifetime(
    name: &'static str,
    raw: Option<String>,
    default: i64,
    unit: fn(i64) -> Option<TimeDelta>,
) -> Result<TimeDelta, ConfigError> {
    let count = parse_positive(name, raw.clone(), default)?;
    unit(count)
        .filter(|lifetime| Utc::now().checked_add_signed(*lifetime).is_some())
        .ok_or(ConfigError::Invalid {
            name,
            value: raw.unwrap_or_default(),
        })
}
