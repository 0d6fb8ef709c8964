//! Run statistics and the idempotency ledger
//!
//! This module owns the final reduction step and the only persistence
//! boundary in the core:
//!
//! - `reducer`: archive table + file name → statistics rows
//! - `ledger`: date-scoped append-only record of processed file names
//!
//! The ledger is queried before an archive is processed and appended to
//! after; a hit stops the whole run (see [`crate::job`]).

mod ledger;
mod reducer;

pub use ledger::{LedgerError, RunLedger, LEDGER_HEADER};
pub use reducer::{reduce, StatisticsRow};
