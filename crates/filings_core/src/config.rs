//! Process configuration for embedding the core.
//!
//! # Responsibility
//! - Resolve database path and logging settings from the environment.
//!
//! # Invariants
//! - Unset variables fall back to defaults; set-but-invalid values fail.
//! - Loading never touches the filesystem.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "FILINGS_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "FILINGS_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "FILINGS_LOG_DIR";

const DEFAULT_DB_PATH: &str = "filings.db";

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub message: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.variable, self.message)
    }
}

impl Error for ConfigError {}

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `FILINGS_*` variables from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = read(DB_PATH_VAR) {
            config.db_path = PathBuf::from(path.trim());
        }
        if let Some(level) = read(LOG_LEVEL_VAR) {
            config.log_level = normalize_level(&level).map_err(|message| ConfigError {
                variable: LOG_LEVEL_VAR,
                message,
            })?;
        }
        if let Some(dir) = read(LOG_DIR_VAR) {
            let dir = normalize_log_dir(&dir).map_err(|message| ConfigError {
                variable: LOG_DIR_VAR,
                message,
            })?;
            config.log_dir = Some(dir);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config.db_path, PathBuf::from("filings.db"));
        assert_eq!(config.log_level, default_log_level());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn variables_override_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[
            ("FILINGS_DB_PATH", " /var/lib/filings/core.db "),
            ("FILINGS_LOG_LEVEL", "WARNING"),
            ("FILINGS_LOG_DIR", "/var/log/filings"),
        ]))
        .expect("valid config");
        assert_eq!(config.db_path, PathBuf::from("/var/lib/filings/core.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/filings")));
    }

    #[test]
    fn invalid_values_name_their_variable() {
        let err = CoreConfig::from_lookup(lookup(&[("FILINGS_LOG_LEVEL", "loud")]))
            .expect_err("unknown level");
        assert_eq!(err.variable, LOG_LEVEL_VAR);

        let err = CoreConfig::from_lookup(lookup(&[("FILINGS_LOG_DIR", "logs")]))
            .expect_err("relative dir");
        assert_eq!(err.variable, LOG_DIR_VAR);
    }

    #[test]
    fn load_reads_the_process_environment() {
        std::env::set_var(LOG_LEVEL_VAR, "error");
        let loaded = CoreConfig::load();
        std::env::remove_var(LOG_LEVEL_VAR);

        assert_eq!(loaded.expect("valid level").log_level, "error");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config =
            CoreConfig::from_lookup(lookup(&[("FILINGS_LOG_LEVEL", "  ")])).expect("blank level");
        assert_eq!(config.log_level, default_log_level());
    }
}
