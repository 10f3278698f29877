//! Source Locator - finds the four source exports in the data directory.

use crate::error::{LookupError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name patterns for each relation. `*` matches any run of characters,
/// `?` a single character.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourcePatterns {
    pub listings: String,
    pub breakdowns: String,
    pub primary_descriptions: String,
    pub backup_descriptions: String,
}

impl Default for SourcePatterns {
    fn default() -> Self {
        Self {
            listings: "*Yurika*Listings*7-11-2024.csv".to_string(),
            breakdowns: "*Yurika*Breakdowns*7-11-2024.csv".to_string(),
            primary_descriptions: "*scdesc*7-11-2024.csv".to_string(),
            backup_descriptions: "*Backup*Descriptions*.csv".to_string(),
        }
    }
}

impl SourcePatterns {
    /// Load patterns from a JSON file; omitted fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LookupError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            LookupError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

/// Resolved file paths for the four relations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub listings: PathBuf,
    pub breakdowns: PathBuf,
    pub primary_descriptions: PathBuf,
    pub backup_descriptions: PathBuf,
}

/// Compile a wildcard file pattern into an anchored regex
pub fn wildcard_regex(pattern: &str) -> Result<Regex> {
    let mut expr = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr)
        .map_err(|e| LookupError::Config(format!("Invalid source pattern '{}': {}", pattern, e)))
}

/// Find every relation's file in `data_dir`. The first match by file name wins.
pub fn locate(data_dir: impl AsRef<Path>, patterns: &SourcePatterns) -> Result<SourcePaths> {
    let data_dir = data_dir.as_ref();
    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        LookupError::DataUnavailable(format!(
            "Cannot read data directory {}: {}",
            data_dir.display(),
            e
        ))
    })?;

    let mut file_names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                file_names.push(name.to_string());
            }
        }
    }
    file_names.sort();
    debug!("{} candidate files in {}", file_names.len(), data_dir.display());

    let wanted = [
        ("listings", &patterns.listings),
        ("breakdowns", &patterns.breakdowns),
        ("primary descriptions", &patterns.primary_descriptions),
        ("backup descriptions", &patterns.backup_descriptions),
    ];

    let mut resolved = Vec::with_capacity(wanted.len());
    let mut missing = Vec::new();
    for (relation, pattern) in wanted {
        let re = wildcard_regex(pattern)?;
        match file_names.iter().find(|name| re.is_match(name)) {
            Some(name) => resolved.push(data_dir.join(name)),
            None => missing.push(format!("{} ({})", relation, pattern)),
        }
    }

    if !missing.is_empty() {
        return Err(LookupError::DataUnavailable(format!(
            "One or more CSV files are missing in {}: {}",
            data_dir.display(),
            missing.join(", ")
        )));
    }

    let [listings, breakdowns, primary_descriptions, backup_descriptions]: [PathBuf; 4] = resolved
        .try_into()
        .map_err(|_| LookupError::DataUnavailable("expected four source files".to_string()))?;
    let paths = SourcePaths {
        listings,
        breakdowns,
        primary_descriptions,
        backup_descriptions,
    };
    info!("Located sources in {}", data_dir.display());
    Ok(paths)
}
