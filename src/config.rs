//! Runtime configuration: data directory, audit log location, source patterns.
//!
//! Values come from command-line flags first, then `CU_LOOKUP_*` environment
//! variables (a `.env` file is honoured), then defaults.

use crate::error::Result;
use crate::ingestion::SourcePatterns;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "CU_LOOKUP_DATA_DIR";
pub const AUDIT_LOG_ENV: &str = "CU_LOOKUP_AUDIT_LOG";

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_AUDIT_LOG: &str = "cu_sc_tool.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub data_dir: PathBuf,
    pub audit_log: PathBuf,
    pub patterns: SourcePatterns,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            audit_log: PathBuf::from(DEFAULT_AUDIT_LOG),
            patterns: SourcePatterns::default(),
        }
    }
}

impl LookupConfig {
    /// Merge explicit values over `lookup_env` over defaults
    pub fn resolve<F>(
        data_dir: Option<PathBuf>,
        audit_log: Option<PathBuf>,
        sources: Option<&Path>,
        lookup_env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let data_dir = data_dir
            .or_else(|| lookup_env(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or(defaults.data_dir);
        let audit_log = audit_log
            .or_else(|| lookup_env(AUDIT_LOG_ENV).map(PathBuf::from))
            .unwrap_or(defaults.audit_log);
        let patterns = match sources {
            Some(path) => SourcePatterns::load(path)?,
            None => defaults.patterns,
        };
        Ok(Self {
            data_dir,
            audit_log,
            patterns,
        })
    }

    /// `resolve` against the process environment
    pub fn from_env(
        data_dir: Option<PathBuf>,
        audit_log: Option<PathBuf>,
        sources: Option<&Path>,
    ) -> Result<Self> {
        Self::resolve(data_dir, audit_log, sources, |key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use std::collections::HashMap;

    #[test]
    fn test_flags_override_env_override_defaults() {
        let mut env = HashMap::new();
        env.insert(DATA_DIR_ENV.to_string(), "/srv/cu".to_string());
        env.insert(AUDIT_LOG_ENV.to_string(), "/var/log/cu.log".to_string());
        let lookup_env = |key: &str| env.get(key).cloned();

        let config = LookupConfig::resolve(None, None, None, lookup_env).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/cu"));
        assert_eq!(config.audit_log, PathBuf::from("/var/log/cu.log"));

        let config =
            LookupConfig::resolve(Some(PathBuf::from("local")), None, None, lookup_env).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("local"));

        let config = LookupConfig::resolve(None, None, None, |_| None).unwrap();
        assert_eq!(config, LookupConfig::default());
    }

    #[test]
    fn test_bad_sources_file_is_config_error() {
        let err = LookupConfig::resolve(None, None, Some(Path::new("/no/such/sources.json")), |_| None)
            .unwrap_err();
        assert!(matches!(err, LookupError::Config(_)));
    }
}
