//! Append-only installation log shared by all workers

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

use crate::installer::InstallOutcome;

/// One log file handle for the whole run, guarded by a mutex so concurrent
/// workers never interleave partial lines. Write failures are reported and
/// swallowed; a full disk must not crash a worker or skew the counters.
pub struct InstallJournal {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl InstallJournal {
    /// Create (truncate) the log file for a fresh sweep.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the status line for one attempt.
    pub fn record(&self, outcome: &InstallOutcome) {
        let line = match &outcome.detail {
            None => format!("driver {} installed successfully", outcome.path.display()),
            Some(detail) => format!("driver {} failed: {}", outcome.path.display(), detail),
        };
        if let Err(err) = self.append(&line) {
            tracing::warn!("failed to write to {}: {err:#}", self.path.display());
        }
    }

    fn append(&self, line: &str) -> Result<()> {
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        // Flush per entry so the log survives an aborted run
        writer.flush()?;
        Ok(())
    }
}
