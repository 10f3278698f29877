//! Search Audit Log
//!
//! One record per search invocation, appended as a JSON line to the audit file
//! and kept in a bounded in-memory buffer.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Where the lookup facade reports searches
pub trait AuditSink {
    fn record_search(&self, query: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLogEntry {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub message: String,
}

impl SearchLogEntry {
    pub fn new(query: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            query: query.to_string(),
            message: format!("User searched for: {}", query),
        }
    }
}

pub struct SearchAuditLog {
    log_file: Option<PathBuf>,
    entries: Mutex<VecDeque<SearchLogEntry>>,
    max_in_memory_logs: usize,
}

impl SearchAuditLog {
    pub fn new(log_file: Option<PathBuf>, max_in_memory_logs: usize) -> Self {
        Self {
            log_file,
            entries: Mutex::new(VecDeque::new()),
            max_in_memory_logs,
        }
    }

    /// Memory only, nothing written to disk
    pub fn in_memory(max_in_memory_logs: usize) -> Self {
        Self::new(None, max_in_memory_logs)
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    pub fn log_search(&self, entry: SearchLogEntry) -> Result<()> {
        {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.push_back(entry.clone());
            while entries.len() > self.max_in_memory_logs {
                entries.pop_front();
            }
        }

        if let Some(ref log_file) = self.log_file {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?;
            let json = serde_json::to_string(&entry)?;
            writeln!(file, "{}", json)?;
        }

        Ok(())
    }

    /// Most recent entries, oldest first
    pub fn recent(&self) -> Vec<SearchLogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

impl AuditSink for SearchAuditLog {
    fn record_search(&self, query: &str) -> Result<()> {
        self.log_search(SearchLogEntry::new(query))
    }
}
