//! Keys of splits that were already announced, one `TICKER_EXDATE` per line.

use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct NotifiedHistory {
    path: PathBuf,
    keys: BTreeSet<String>,
}

impl NotifiedHistory {
    /// Load the history file.
    ///
    /// A missing file starts an empty history. An unreadable file also does,
    /// after a warning, so a broken history never blocks a run.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let keys = match std::fs::read_to_string(&path) {
            Ok(raw) => {
                let keys: BTreeSet<String> = raw
                    .lines()
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect();
                info!(path = %path.display(), entries = keys.len(), "loaded notification history");
                keys
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no notification history yet, starting fresh");
                BTreeSet::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read notification history");
                BTreeSet::new()
            }
        };
        Self { path, keys }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Returns false when the key was already present.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Rewrite the file with every key, sorted.
    pub fn save(&self) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let mut out = String::new();
        for key in &self.keys {
            out.push_str(key);
            out.push('\n');
        }
        std::fs::write(&self.path, out)
    }

    /// [`NotifiedHistory::save`], logging instead of failing.
    pub fn persist(&self) {
        match self.save() {
            Ok(()) => info!(path = %self.path.display(), entries = self.keys.len(), "saved notification history"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "could not save notification history"),
        }
    }
}
