//! Output module for columnar persistence of archive tables
//!
//! This module handles:
//! - The sink trait the job runner writes finalized tables through
//! - The date-partitioned CSV implementation of that trait

mod partitioned;
mod traits;

pub use partitioned::{PartitionedCsvSink, TABLE_HEADER};
pub use traits::{OutputError, OutputResult, TableSink};
