//! Partitioned CSV sink
//!
//! Writes one file per `fetched_at=<date>` partition directory, named after
//! the archive it came from, with rows sorted by key so output is
//! deterministic across runs.

use crate::aggregate::{AggregateCounts, AggregateKey, ArchiveTable};
use crate::output::{OutputResult, TableSink};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Header row of every partition file
pub const TABLE_HEADER: &str =
    "fetched_at,http_code,domain,user_agent,disallow_cnt,allow_cnt,run_date";

/// Sink writing archive tables as date-partitioned CSV files
#[derive(Debug, Clone)]
pub struct PartitionedCsvSink {
    destination: PathBuf,
}

impl PartitionedCsvSink {
    /// Creates a sink rooted at the destination directory
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    /// Directory of one partition
    pub fn partition_dir(&self, date: NaiveDate) -> PathBuf {
        self.destination.join(format!("fetched_at={}", date))
    }
}

impl TableSink for PartitionedCsvSink {
    fn write_table(
        &self,
        table: &ArchiveTable,
        file_name: &str,
        run_date: &str,
    ) -> OutputResult<()> {
        if table.is_empty() {
            return Ok(());
        }

        let mut partitions: BTreeMap<NaiveDate, Vec<(&AggregateKey, &AggregateCounts)>> =
            BTreeMap::new();
        for (key, counts) in table.iter() {
            partitions
                .entry(key.fetched_at.date_naive())
                .or_default()
                .push((key, counts));
        }

        let part_name = format!("{}.csv", archive_stem(file_name));

        for (date, mut rows) in partitions {
            rows.sort_by(|(a, _), (b, _)| {
                (a.fetched_at, a.http_code, &a.domain, &a.user_agent).cmp(&(
                    b.fetched_at,
                    b.http_code,
                    &b.domain,
                    &b.user_agent,
                ))
            });

            let dir = self.partition_dir(date);
            fs::create_dir_all(&dir)?;

            let mut out = BufWriter::new(File::create(dir.join(&part_name))?);
            writeln!(out, "{}", TABLE_HEADER)?;
            for (key, counts) in rows {
                writeln!(
                    out,
                    "{},{},{},{},{},{},{}",
                    key.fetched_at.to_rfc3339(),
                    key.http_code,
                    csv_field(key.domain.as_deref().unwrap_or("")),
                    csv_field(key.user_agent.as_deref().unwrap_or("")),
                    counts.disallow_count,
                    counts.allow_count,
                    run_date
                )?;
            }
            out.flush()?;
        }

        Ok(())
    }
}

/// Strips the archive extension for use as a partition file stem
fn archive_stem(file_name: &str) -> &str {
    file_name
        .strip_suffix(".warc.gz")
        .or_else(|| file_name.strip_suffix(".gz"))
        .unwrap_or(file_name)
}

/// Quotes a CSV field when its content requires it
///
/// User agent values are arbitrary text and may carry commas or quotes.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
