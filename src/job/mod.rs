//! Job orchestration
//!
//! The entry point the binary drives: one invocation processes a bounded
//! batch of archives for one run date, with the ledger gate deciding whether
//! the run proceeds at all.

mod runner;

pub use runner::{JobRunner, RunOutcome};

use crate::config::Config;
use crate::Result;

/// Runs a complete job invocation
///
/// This is the main entry point for processing archives. It will:
/// 1. Bootstrap the working directories
/// 2. Resolve the work list (single URL or manifest listing)
/// 3. Gate each file against the run ledger
/// 4. Download, aggregate, persist, and count each admitted archive
///
/// # Arguments
///
/// * `config` - The job configuration
///
/// # Returns
///
/// * `Ok(RunOutcome)` - Run finished or stopped cleanly at the gate
/// * `Err(CrawlstatsError)` - Fetch, decode-stream, or persistence failure
pub async fn run_job(config: Config) -> Result<RunOutcome> {
    JobRunner::new(config)?.run().await
}
