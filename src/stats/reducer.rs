//! Statistics reduction
//!
//! Reduces a finished per-archive table plus the archive's file name into
//! summary rows, one per capture date present in the table. The ledger's
//! `date` column is the date of `fetched_at`, so records captured seconds
//! apart on the same day land in the same row.

use crate::aggregate::ArchiveTable;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

/// One summary row per (capture date, file name, run date)
///
/// Appended to the run ledger once computed; never mutated after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsRow {
    /// Date of the `fetched_at` timestamps in this group
    pub date: NaiveDate,

    /// Archive file name the row was computed from
    pub file_name: String,

    /// Run date the row is scoped to (YYYYMMDD)
    pub run_date: String,

    /// Rows in the table with a non-200 status
    pub total_errors: u64,

    /// Rows in the table with a 200 status
    pub total_ok: u64,

    /// Distinct non-null user agent values
    pub total_distinct_user_agents: u64,

    /// Summed allow counts
    pub total_allows: u64,

    /// Summed disallow counts
    pub total_disallows: u64,
}

#[derive(Default)]
struct Group {
    errors: u64,
    ok: u64,
    agents: HashSet<String>,
    allows: u64,
    disallows: u64,
}

/// Reduces an archive table to its statistics rows
///
/// # Arguments
///
/// * `table` - The finalized per-archive table
/// * `file_name` - The archive's file name
/// * `run_date` - The run date the statistics are scoped to
///
/// # Returns
///
/// One row per distinct capture date, ordered by date. Empty when the table
/// has no rows or the file name is absent; that case is a no-op, not an
/// error, and nothing must reach the ledger for it.
pub fn reduce(table: &ArchiveTable, file_name: &str, run_date: &str) -> Vec<StatisticsRow> {
    if table.is_empty() || file_name.is_empty() {
        return Vec::new();
    }

    let mut groups: BTreeMap<NaiveDate, Group> = BTreeMap::new();

    for (key, counts) in table.iter() {
        let group = groups.entry(key.fetched_at.date_naive()).or_default();

        if key.http_code == 200 {
            group.ok += 1;
        } else {
            group.errors += 1;
        }
        if let Some(agent) = &key.user_agent {
            group.agents.insert(agent.clone());
        }
        group.allows += counts.allow_count;
        group.disallows += counts.disallow_count;
    }

    groups
        .into_iter()
        .map(|(date, group)| StatisticsRow {
            date,
            file_name: file_name.to_string(),
            run_date: run_date.to_string(),
            total_errors: group.errors,
            total_ok: group.ok,
            total_distinct_user_agents: group.agents.len() as u64,
            total_allows: group.allows,
            total_disallows: group.disallows,
        })
        .collect()
}
