//! Service configuration for classification and scanning.

use crate::classification::DEFAULT_REGEX_SIZE_LIMIT;
use crate::error::{ColscanError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Schemas skipped by every scan unless configured otherwise.
pub const DEFAULT_EXCLUDED_SCHEMAS: [&str; 4] =
    ["information_schema", "performance_schema", "mysql", "sys"];

/// Settings shared by the classification engine and the scan orchestrator.
///
/// # Example
/// ```rust
/// use colscan_core::config::ServiceConfig;
/// use std::time::Duration;
///
/// let config = ServiceConfig::default()
///     .with_history_limit(25)
///     .with_connect_timeout(Duration::from_secs(5));
///
/// assert!(config.validate().is_ok());
/// assert!(config.is_excluded_schema("MySQL"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// History entries returned when a caller asks for 0
    pub history_limit: usize,
    /// Schemas never walked during a scan (compared case-insensitively)
    pub excluded_schemas: Vec<String>,
    /// Compiled-size limit for each classification pattern, in bytes
    pub regex_size_limit: usize,
    /// JSON seed file used when the pattern store is empty
    pub pattern_seed_path: Option<PathBuf>,
    /// Connection establishment timeout for inspector sessions
    pub connect_timeout: Duration,
    /// Pool size of each inspector session
    pub max_connections: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            history_limit: 10,
            excluded_schemas: DEFAULT_EXCLUDED_SCHEMAS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
            pattern_seed_path: None,
            connect_timeout: Duration::from_secs(30),
            max_connections: 2,
        }
    }
}

impl ServiceConfig {
    /// Validates configuration values.
    ///
    /// # Errors
    /// Returns a configuration error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(ColscanError::configuration(
                "history_limit must be greater than 0",
            ));
        }

        if self.regex_size_limit == 0 {
            return Err(ColscanError::configuration(
                "regex_size_limit must be greater than 0",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(ColscanError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.max_connections == 0 || self.max_connections > 25 {
            return Err(ColscanError::configuration(
                "max_connections must be between 1 and 25",
            ));
        }

        if self.excluded_schemas.iter().any(|s| s.trim().is_empty()) {
            return Err(ColscanError::configuration(
                "excluded_schemas must not contain empty names",
            ));
        }

        Ok(())
    }

    /// True if scans skip `schema_name`.
    pub fn is_excluded_schema(&self, schema_name: &str) -> bool {
        self.excluded_schemas
            .iter()
            .any(|s| s.eq_ignore_ascii_case(schema_name))
    }

    /// Replaces a requested history limit of 0 with the configured default.
    pub fn effective_history_limit(&self, requested: usize) -> usize {
        if requested == 0 {
            self.history_limit
        } else {
            requested
        }
    }

    /// Builder method to set the default history limit.
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    /// Builder method to replace the excluded schemas.
    pub fn with_excluded_schemas<I, S>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_schemas = schemas.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the per-pattern compiled-size limit.
    pub fn with_regex_size_limit(mut self, regex_size_limit: usize) -> Self {
        self.regex_size_limit = regex_size_limit;
        self
    }

    /// Builder method to set the pattern seed file.
    pub fn with_pattern_seed_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pattern_seed_path = Some(path.into());
        self
    }

    /// Builder method to set the connect timeout.
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Builder method to set the inspector pool size.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}
