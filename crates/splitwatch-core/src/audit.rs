//! Append-only JSON Lines log of raw classifier responses.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One immutable entry per batch call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// ISO 8601, taken when the request was issued.
    pub timestamp: String,
    pub model_used: String,
    pub tickers_requested: Vec<String>,
    pub raw_response_text: String,
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line, creating parent directories and the file as needed.
    pub fn append(&self, record: &AuditRecord) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }

    /// Like [`AuditLog::append`], but a failure only logs a warning.
    pub fn record(&self, record: &AuditRecord) {
        if let Err(e) = self.append(record) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "could not write classifier response to audit log"
            );
        }
    }
}
