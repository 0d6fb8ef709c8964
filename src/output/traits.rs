//! Output sink trait and error types
//!
//! The sink is a pure consumer of finalized archive tables; the pipeline
//! enforces no contract beyond the table schema.

use crate::aggregate::ArchiveTable;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for columnar persistence of finalized archive tables
pub trait TableSink {
    /// Persists one archive's finalized table
    ///
    /// # Arguments
    ///
    /// * `table` - The finalized per-archive table
    /// * `file_name` - The archive file name, used to name output files
    /// * `run_date` - The run date stamped onto every row
    fn write_table(&self, table: &ArchiveTable, file_name: &str, run_date: &str)
        -> OutputResult<()>;
}
