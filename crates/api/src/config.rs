//! Environment snapshot.
//!
//! All recognized options are read exactly once at startup into an immutable
//! [`AppConfig`]; no component re-reads process environment state afterwards.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;

use venuity_core::{Environment, ParseEnvironmentError};
use venuity_infra::db::DatabaseConfig;

const DEFAULT_PORT: u16 = 5001;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;

/// Immutable configuration snapshot shared by every component.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listening port. `0` binds an ephemeral port (used by tests).
    pub port: u16,
    pub environment: Environment,
    pub cors: CorsPolicy,
    pub database: DatabaseConfig,
    /// Root directory served under `/uploads`.
    pub upload_dir: PathBuf,
    /// Request body decode limit in bytes.
    pub max_body_bytes: usize,
    /// Per-request timeout applied by the pipeline.
    pub request_timeout: Duration,
    /// Bound on connection draining during graceful shutdown.
    pub shutdown_grace: Duration,
}

impl AppConfig {
    /// Read the snapshot from the process environment.
    ///
    /// Malformed values are startup-fatal; the caller logs the error and
    /// exits non-zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::invalid("PORT", &raw, "expected a port number"))?,
            None => DEFAULT_PORT,
        };

        let environment = match lookup("APP_ENV") {
            Some(raw) => raw.parse::<Environment>()?,
            None => Environment::default(),
        };

        let cors = match lookup("CORS_ORIGIN") {
            Some(raw) => CorsPolicy::parse(&raw)?,
            None => CorsPolicy::AllowAny,
        };

        let database = DatabaseConfig::new(
            lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
        );

        let upload_dir = lookup("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));

        let max_body_bytes = parse_nonzero(&lookup, "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?;
        let request_timeout = Duration::from_secs(parse_nonzero(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        let shutdown_grace = Duration::from_secs(parse_nonzero(
            &lookup,
            "SHUTDOWN_GRACE_SECS",
            DEFAULT_SHUTDOWN_GRACE_SECS,
        )?);

        Ok(Self {
            port,
            environment,
            cors,
            database,
            upload_dir,
            max_body_bytes,
            request_timeout,
            shutdown_grace,
        })
    }
}

fn parse_nonzero<T>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::invalid(name, &raw, "expected a positive integer"))?;
    if value == T::default() {
        return Err(ConfigError::invalid(name, &raw, "must be non-zero"));
    }
    Ok(value)
}

/// Allowed-origin policy for the CORS stage.
#[derive(Debug, Clone)]
pub enum CorsPolicy {
    /// Any origin may read responses; credentials are not honored (a
    /// credentialed wildcard is not a valid CORS configuration).
    AllowAny,
    /// Exact-match allow-list of origins; credentials are honored.
    AllowList(Vec<HeaderValue>),
}

impl CorsPolicy {
    /// Parse the `CORS_ORIGIN` value: `*` (or empty) allows every origin,
    /// anything else is a comma-separated allow-list of exact origins.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            return Ok(CorsPolicy::AllowAny);
        }

        let mut origins = Vec::new();
        for entry in raw.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let value = HeaderValue::from_str(entry).map_err(|_| {
                ConfigError::invalid("CORS_ORIGIN", entry, "origin is not a valid header value")
            })?;
            origins.push(value);
        }

        if origins.is_empty() {
            Ok(CorsPolicy::AllowAny)
        } else {
            Ok(CorsPolicy::AllowList(origins))
        }
    }

    /// Whether a request `Origin` header satisfies the policy.
    pub fn allows(&self, origin: &HeaderValue) -> bool {
        match self {
            CorsPolicy::AllowAny => true,
            CorsPolicy::AllowList(origins) => origins.iter().any(|allowed| allowed == origin),
        }
    }
}

/// Startup configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error(transparent)]
    Environment(#[from] ParseEnvironmentError),
}

impl ConfigError {
    fn invalid(name: &'static str, value: &str, reason: &'static str) -> Self {
        ConfigError::InvalidVar {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + '_ {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config =
            AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/venuity")]))
                .unwrap();

        assert_eq!(config.port, 5001);
        assert_eq!(config.environment, Environment::Development);
        assert!(matches!(config.cors, CorsPolicy::AllowAny));
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.shutdown_grace, Duration::from_secs(30));
    }

    #[test]
    fn database_url_is_required() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn malformed_port_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/venuity"),
            ("PORT", "fivethousand"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { name: "PORT", .. }));
    }

    #[test]
    fn unknown_environment_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/venuity"),
            ("APP_ENV", "staging"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Environment(_)));
    }

    #[test]
    fn zero_body_limit_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/venuity"),
            ("MAX_BODY_BYTES", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVar {
                name: "MAX_BODY_BYTES",
                ..
            }
        ));
    }

    #[test]
    fn cors_wildcard_and_empty_mean_allow_any() {
        assert!(matches!(CorsPolicy::parse("*").unwrap(), CorsPolicy::AllowAny));
        assert!(matches!(CorsPolicy::parse("").unwrap(), CorsPolicy::AllowAny));
        assert!(matches!(CorsPolicy::parse("  ").unwrap(), CorsPolicy::AllowAny));
    }

    #[test]
    fn cors_list_is_split_and_trimmed() {
        let policy =
            CorsPolicy::parse("https://admin.venuity.com, https://app.venuity.com").unwrap();

        let allowed = HeaderValue::from_static("https://app.venuity.com");
        let denied = HeaderValue::from_static("https://evil.example.com");
        assert!(policy.allows(&allowed));
        assert!(!policy.allows(&denied));
    }
}
