//! Aggregation key, counts, and the per-archive table
//!
//! The table is the cumulative state of the two-level reduction: per-record
//! fragments are folded into it in record-arrival order, and matching keys
//! always sum into the existing entry rather than duplicating it.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Grouping identity for directive counts
///
/// `domain` and `user_agent` are `None` for rows that never observed them
/// (non-200 responses carry no user agent; a record without a parseable
/// target has no domain).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregateKey {
    /// Capture timestamp of the archive record (WARC-Date)
    pub fetched_at: DateTime<Utc>,

    /// HTTP status code of the captured response
    pub http_code: u16,

    /// Lowercased host of the target URI
    pub domain: Option<String>,

    /// Most recently seen User-agent value at the emitting line
    pub user_agent: Option<String>,
}

/// Reduced directive metric for one key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateCounts {
    pub disallow_count: u64,
    pub allow_count: u64,
}

impl AggregateCounts {
    /// The zero counts every key starts from
    pub const ZERO: AggregateCounts = AggregateCounts {
        disallow_count: 0,
        allow_count: 0,
    };

    /// Counts for a single `Disallow` observation
    pub const ONE_DISALLOW: AggregateCounts = AggregateCounts {
        disallow_count: 1,
        allow_count: 0,
    };

    /// Counts for a single `Allow` observation
    pub const ONE_ALLOW: AggregateCounts = AggregateCounts {
        disallow_count: 0,
        allow_count: 1,
    };

    /// Sums another count pair into this one
    pub fn add(&mut self, other: AggregateCounts) {
        self.disallow_count += other.disallow_count;
        self.allow_count += other.allow_count;
    }
}

/// Mapping of `AggregateKey` to `AggregateCounts` for one archive
///
/// Also serves as the per-record fragment type: the record aggregator builds
/// a small table for each record and the archive fold merges fragments into
/// the cumulative one. Not safe for concurrent folding; `&mut self` on every
/// mutation enforces the single-writer discipline.
#[derive(Debug, Clone, Default)]
pub struct ArchiveTable {
    rows: HashMap<AggregateKey, AggregateCounts>,
}

impl ArchiveTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Sums counts into the entry for `key`, creating it at zero if absent
    pub fn merge_row(&mut self, key: AggregateKey, counts: AggregateCounts) {
        self.rows.entry(key).or_default().add(counts);
    }

    /// Unions a fragment into this table, summing counts on key match
    pub fn merge(&mut self, fragment: ArchiveTable) {
        for (key, counts) in fragment.rows {
            self.merge_row(key, counts);
        }
    }

    /// Number of distinct keys in the table
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Counts for a specific key, if present
    pub fn get(&self, key: &AggregateKey) -> Option<&AggregateCounts> {
        self.rows.get(key)
    }

    /// Iterates over all rows in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&AggregateKey, &AggregateCounts)> {
        self.rows.iter()
    }
}
