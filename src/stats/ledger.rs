//! Run ledger: the idempotency gate
//!
//! An append-only, comma-delimited file per run date recording which archive
//! file names have already been counted. Read before each archive; appended
//! after. Never truncated or rewritten.

use crate::stats::StatisticsRow;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Header row of every run ledger file
pub const LEDGER_HEADER: &str =
    "date,file_name,run_date,total_errors,total_ok,total_distinct_user_agents,total_allows,total_disallows";

/// Errors from ledger writes
///
/// Reads deliberately have no error type: a missing or unreadable ledger
/// means "nothing processed yet".
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to append to ledger {path}: {source}")]
    Append {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Date-scoped, append-only record of processed archives
#[derive(Debug, Clone)]
pub struct RunLedger {
    statistics_dir: PathBuf,
}

impl RunLedger {
    /// Creates a ledger rooted at the given statistics directory
    pub fn new(statistics_dir: impl Into<PathBuf>) -> Self {
        Self {
            statistics_dir: statistics_dir.into(),
        }
    }

    /// Path of the ledger file for a run date
    pub fn path_for(&self, run_date: &str) -> PathBuf {
        self.statistics_dir.join(format!("{}.csv", run_date))
    }

    /// Reports whether a file name already appears in the run date's ledger
    ///
    /// A missing or unreadable ledger answers `false`: nothing has been
    /// processed yet for that run date.
    ///
    /// # Arguments
    ///
    /// * `run_date` - The run date scope (YYYYMMDD)
    /// * `file_name` - The archive file name to look up
    pub fn has_processed(&self, run_date: &str, file_name: &str) -> bool {
        let path = self.path_for(run_date);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(_) => {
                tracing::info!(
                    "File '{}' wasn't loaded yet or '{}' is missing",
                    file_name,
                    path.display()
                );
                return false;
            }
        };

        // First line is always the header; file names live in column 1.
        for line in BufReader::new(file).lines().skip(1) {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::info!("Ledger '{}' unreadable ({}), treating as empty", path.display(), e);
                    return false;
                }
            };
            if let Some(name) = line.split(',').nth(1) {
                if name == file_name {
                    return true;
                }
            }
        }

        false
    }

    /// Appends statistics rows to the run date's ledger
    ///
    /// Creates the file with its header on first write; later appends add
    /// rows only. The data is synced to disk before returning: the run only
    /// counts an archive once its rows are durable.
    ///
    /// # Arguments
    ///
    /// * `run_date` - The run date scope (YYYYMMDD)
    /// * `rows` - Rows produced by the statistics reducer; an empty slice is
    ///   a no-op and touches nothing
    pub fn append(&self, run_date: &str, rows: &[StatisticsRow]) -> Result<(), LedgerError> {
        if rows.is_empty() {
            return Ok(());
        }

        let path = self.path_for(run_date);
        let wrap = |source| LedgerError::Append {
            path: path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(wrap)?;

        let is_new = file.metadata().map_err(wrap)?.len() == 0;
        if is_new {
            writeln!(file, "{}", LEDGER_HEADER).map_err(wrap)?;
        }

        for row in rows {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{}",
                row.date,
                row.file_name,
                row.run_date,
                row.total_errors,
                row.total_ok,
                row.total_distinct_user_agents,
                row.total_allows,
                row.total_disallows
            )
            .map_err(wrap)?;
        }

        file.sync_all().map_err(wrap)?;
        tracing::info!("Check statistics file here: '{}'", path.display());
        Ok(())
    }
}
