//! Aggregation pipeline for archive records
//!
//! This module implements the two-level reduction at the heart of the
//! pipeline:
//!
//! - `classifier`: one text line → zero or one typed directive
//! - `record`: one archive record → one per-record table fragment
//! - `table`: fragments folded into the cumulative per-archive table
//!
//! # Example
//!
//! ```
//! use crawlstats::aggregate::{aggregate_record, ArchiveTable};
//! use crawlstats::warc::ResponseRecord;
//! use chrono::Utc;
//!
//! let record = ResponseRecord {
//!     fetched_at: Utc::now(),
//!     http_code: 200,
//!     target_uri: "https://example.com/robots.txt".to_string(),
//!     payload: b"User-agent: *\nDisallow:/private\n".to_vec(),
//! };
//!
//! let mut table = ArchiveTable::new();
//! table.merge(aggregate_record(&record));
//! assert_eq!(table.len(), 1);
//! ```

mod classifier;
mod record;
mod table;

pub use classifier::{classify_line, Directive};
pub use record::aggregate_record;
pub use table::{AggregateCounts, AggregateKey, ArchiveTable};
