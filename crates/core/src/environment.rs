//! Deployment environment value object.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resolved deployment environment.
///
/// Parsed once from the process environment at startup; components read the
/// same value for the whole process lifetime. The environment gates
/// diagnostic request logging and documentation exposure, nothing else.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }

    /// Development-like: diagnostic request logging is active.
    pub fn is_development(self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Production-like: documentation endpoints are withheld.
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error produced when an environment name is not recognized.
///
/// Unknown names are rejected at startup rather than silently treated as
/// "not production".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognized environment name {0:?} (expected development, test, or production)")]
pub struct ParseEnvironmentError(pub String);

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ParseEnvironmentError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_case_insensitively() {
        assert_eq!("Production".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("dev".parse::<Environment>(), Ok(Environment::Development));
        assert_eq!(" test ".parse::<Environment>(), Ok(Environment::Test));
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "staging".parse::<Environment>().unwrap_err();
        assert_eq!(err, ParseEnvironmentError("staging".to_string()));
    }

    #[test]
    fn defaults_to_development() {
        assert_eq!(Environment::default(), Environment::Development);
        assert!(Environment::default().is_development());
        assert!(!Environment::default().is_production());
    }

    #[test]
    fn display_matches_canonical_name() {
        assert_eq!(Environment::Production.to_string(), "production");
    }
}
