//! Optional append-only journal of call records.
//!
//! One JSON object per line. The journal outlives sessions: clearing a
//! [`MetricsStore`](crate::MetricsStore) leaves it untouched, so it can
//! feed cross-session dashboards.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::Result;
use crate::types::CallRecord;

/// Append-only JSON-lines writer for [`CallRecord`]s.
#[derive(Debug)]
pub struct CallJournal {
    path: PathBuf,
    file: Mutex<File>,
}

impl CallJournal {
    /// Open (or create) the journal at `path`, creating parent directories.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single line.
    pub fn append(&self, record: &CallRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Load every record from a journal file, in file order.
    ///
    /// A missing file yields no records. Malformed lines are skipped with a
    /// warning rather than failing the whole load.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<CallRecord>> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CallRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "skipping malformed journal entry"
                ),
            }
        }
        Ok(records)
    }
}
