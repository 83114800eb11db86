//! Per-run log file
//!
//! Every apply run appends human-readable status lines to a dedicated file,
//! so the run can be audited after the terminal scrollback is gone. Lines are
//! written open-append-close with no buffering, keeping the file complete up
//! to the last action even if the process dies mid-batch.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::warn;

use crate::error::Result;

/// Timestamp format shared by the log file name and the backup directory
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Format the current local time as a run stamp
pub fn run_stamp() -> String {
    Local::now().format(RUN_STAMP_FORMAT).to_string()
}

/// Append-only log file for one apply run
#[derive(Debug, Clone)]
pub struct RunLogger {
    path: PathBuf,
}

impl RunLogger {
    /// Create the log file in `dir` and write its header
    pub fn create(dir: &Path, stamp: &str, dry_run: bool) -> Result<Self> {
        let path = dir.join(format!("alert_update_log_{stamp}.txt"));

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "=== Alert Update Log: {stamp} ===")?;
        writeln!(file, "Dry Run Mode: {}", if dry_run { "YES" } else { "NO" })?;
        writeln!(file)?;

        Ok(Self { path })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a timestamped status line
    pub fn log(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{now}] {message}")?;
        Ok(())
    }

    /// Append a status line, downgrading write failures to a warning.
    ///
    /// Used mid-batch: a failing log write must not abort updates that are
    /// already partially applied.
    pub fn log_best_effort(&self, message: &str) {
        if let Err(e) = self.log(message) {
            warn!(path = %self.path.display(), error = %e, "failed to write run log line");
        }
    }
}
