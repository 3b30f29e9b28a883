//! API server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `CATALOG_JWT_SECRET` - Token signing secret (min 32 chars, high entropy; falls back to `JWT_SECRET`)
//!
//! ## Optional
//! - `CATALOG_HOST` - Bind address (default: 127.0.0.1)
//! - `CATALOG_PORT` - Listen port (default: 5000, falls back to `PORT`)
//! - `CATALOG_MAX_BODY_BYTES` - JSON body limit in bytes (default: 50 MiB, sized for embedded images)
//! - `CATALOG_CORS_ORIGINS` - Comma-separated allowed origins (default: any origin)
//! - `CATALOG_LOG_JSON` - Emit JSON logs when `true` (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

use crate::routes::DEFAULT_MAX_BODY_BYTES;

const DEFAULT_PORT: u16 = 5000;
const MIN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a secret as copied from a sample file.
const PLACEHOLDERS: &[&str] = &[
    "changeme",
    "change-me",
    "placeholder",
    "example",
    "secret",
    "password",
    "your-",
    "xxx",
    "todo",
    "default_super",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid environment variable {name}: {reason}")]
    InvalidEnvVar { name: &'static str, reason: String },
    #[error("Insecure {name}: {reason}")]
    InsecureSecret { name: &'static str, reason: String },
}

/// API server configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// HS256 token signing secret
    pub jwt_secret: SecretString,
    pub max_body_bytes: usize,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    pub log_json: bool,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("database_url", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("max_body_bytes", &self.max_body_bytes)
            .field("cors_origins", &self.cors_origins)
            .field("log_json", &self.log_json)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[SET]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from the process environment, after reading a
    /// `.env` file if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value does
    /// not parse, or the signing secret is weak.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(lookup);

        let database_url = vars
            .first(&["CATALOG_DATABASE_URL", "DATABASE_URL"])
            .ok_or(ConfigError::MissingEnvVar("CATALOG_DATABASE_URL"))?;
        let jwt_secret = vars
            .first(&["CATALOG_JWT_SECRET", "JWT_SECRET"])
            .ok_or(ConfigError::MissingEnvVar("CATALOG_JWT_SECRET"))?;
        check_signing_secret("CATALOG_JWT_SECRET", &jwt_secret)?;

        let port = match vars.first(&["CATALOG_PORT", "PORT"]) {
            Some(raw) => parse_value("CATALOG_PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url: SecretString::from(database_url),
            host: vars.parsed("CATALOG_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port,
            jwt_secret: SecretString::from(jwt_secret),
            max_body_bytes: vars.parsed("CATALOG_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            cors_origins: vars
                .get("CATALOG_CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
            log_json: match vars.get("CATALOG_LOG_JSON") {
                Some(raw) => parse_bool("CATALOG_LOG_JSON", &raw)?,
                None => false,
            },
            sentry_dsn: vars.get("SENTRY_DSN"),
            sentry_environment: vars.get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Variable lookup that treats blank values as unset.
struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// The first of `keys` that is set.
    fn first(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get(key))
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map_or(Ok(default), |raw| parse_value(key, &raw))
    }
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar {
            name,
            reason: e.to_string(),
        })
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            name,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Reject short, placeholder or low-entropy signing secrets.
fn check_signing_secret(name: &'static str, secret: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| ConfigError::InsecureSecret { name, reason };

    let length = secret.chars().count();
    if length < MIN_SECRET_LENGTH {
        return Err(insecure(format!(
            "must be at least {MIN_SECRET_LENGTH} characters (got {length})"
        )));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDERS.iter().find(|p| lower.contains(*p)) {
        return Err(insecure(format!(
            "appears to be a placeholder (contains '{pattern}')"
        )));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(insecure(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
        )));
    }
    Ok(())
}

/// Shannon entropy in bits per character.
#[allow(clippy::cast_precision_loss)] // secrets are far below f64's exact integer range
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}
