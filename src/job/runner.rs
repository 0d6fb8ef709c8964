//! Job runner - main pipeline orchestration
//!
//! Drives one invocation of the pipeline:
//! - Bootstraps the working directories
//! - Resolves the work list (single URL or bounded manifest listing)
//! - Per archive: ledger gate, download, aggregate fold, sink write,
//!   statistics reduction, ledger append, source cleanup
//!
//! The ledger gate is a whole-run stop: the first already-counted file ends
//! the invocation, including any files that were still queued behind it.

use crate::aggregate::{aggregate_record, ArchiveTable};
use crate::config::Config;
use crate::fetch::{
    build_http_client, download_archive, file_name_from_url, remove_source, ArchiveList,
};
use crate::output::{PartitionedCsvSink, TableSink};
use crate::stats::{reduce, RunLedger};
use crate::warc::WarcReader;
use crate::{ConfigError, CrawlstatsError, Result};
use reqwest::Client;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Outcome of one job invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// All selected archives were processed and counted
    Completed { files_processed: usize },

    /// The gate hit an already-counted file; the whole run stopped cleanly
    AlreadyProcessed { file_name: String },
}

/// Whether one archive passed the gate and was counted
enum Gate {
    Processed,
    Hit(String),
}

/// Main pipeline runner
pub struct JobRunner {
    config: Config,
    run_date: String,
    client: Client,
    ledger: RunLedger,
    sink: Box<dyn TableSink + Send + Sync>,
}

impl JobRunner {
    /// Creates a runner from validated configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The job configuration (CLI overrides already applied)
    ///
    /// # Returns
    ///
    /// * `Ok(JobRunner)` - Ready to run
    /// * `Err(CrawlstatsError)` - HTTP client construction failed
    pub fn new(config: Config) -> Result<Self> {
        let run_date = config.job.resolved_run_date();
        let client = build_http_client()?;
        let ledger = RunLedger::new(&config.storage.statistics_dir);
        let sink = Box::new(PartitionedCsvSink::new(&config.storage.destination_dir));

        Ok(Self {
            config,
            run_date,
            client,
            ledger,
            sink,
        })
    }

    /// The run date this invocation is scoped to
    pub fn run_date(&self) -> &str {
        &self.run_date
    }

    /// Runs the job to completion or to the first ledger hit
    pub async fn run(&self) -> Result<RunOutcome> {
        self.bootstrap_dirs()?;

        tracing::info!("Run date: {}", self.run_date);
        tracing::info!("Starting job...");

        if let Some(url) = self.config.source.unloading_url.clone() {
            tracing::info!("unloading_url: '{}'", url);
            return match self.process_archive(&url).await? {
                Gate::Processed => Ok(RunOutcome::Completed { files_processed: 1 }),
                Gate::Hit(file_name) => Ok(RunOutcome::AlreadyProcessed { file_name }),
            };
        }

        self.run_listing().await
    }

    /// Processes manifest-listed archives up to the files-per-run bound
    async fn run_listing(&self) -> Result<RunOutcome> {
        let manifest = self.config.source.manifest.clone().ok_or_else(|| {
            ConfigError::Validation("no manifest and no unloading-url configured".to_string())
        })?;

        let listing = if manifest.starts_with("http://") || manifest.starts_with("https://") {
            ArchiveList::fetch(&self.client, &manifest).await?
        } else {
            ArchiveList::open(Path::new(&manifest))?
        };

        let files_per_run = self.config.job.files_per_run as usize;
        let mut processed = 0usize;

        for key in listing {
            let key = key?;
            let url = join_url(&self.config.source.base_url, &key);

            match self.process_archive(&url).await? {
                Gate::Hit(file_name) => {
                    return Ok(RunOutcome::AlreadyProcessed { file_name });
                }
                Gate::Processed => processed += 1,
            }

            if processed == files_per_run {
                tracing::info!(
                    "Processed number of files '{}' == files per run '{}'... Break",
                    processed,
                    files_per_run
                );
                break;
            }
        }

        if processed == 0 {
            return Err(CrawlstatsError::EmptyListing(manifest));
        }

        Ok(RunOutcome::Completed {
            files_processed: processed,
        })
    }

    /// Gates, fetches, folds, and counts one archive
    async fn process_archive(&self, url: &str) -> Result<Gate> {
        let file_name = file_name_from_url(url)?;

        if self.ledger.has_processed(&self.run_date, &file_name) {
            tracing::info!("File '{}' was loaded. Stop job...", file_name);
            return Ok(Gate::Hit(file_name));
        }

        let archive = download_archive(
            &self.client,
            url,
            Path::new(&self.config.storage.source_dir),
            Path::new(&self.config.storage.extracted_dir),
        )
        .await?;

        let table = self.fold_archive(&archive.extracted_path)?;

        self.sink
            .write_table(&table, &archive.file_name, &self.run_date)?;

        let rows = reduce(&table, &archive.file_name, &self.run_date);
        self.ledger.append(&self.run_date, &rows)?;

        remove_source(&archive)?;
        tracing::info!("Finished processing file: '{}'", archive.file_name);

        Ok(Gate::Processed)
    }

    /// Folds every response record of an extracted archive into one table
    ///
    /// A stream-level decode error keeps the rows folded so far: the reader
    /// cannot realign after it, but the records already consumed are sound.
    fn fold_archive(&self, path: &Path) -> Result<ArchiveTable> {
        let file = File::open(path)?;
        let mut table = ArchiveTable::new();
        let mut records = 0u64;

        for result in WarcReader::new(BufReader::new(file)) {
            match result {
                Ok(record) => {
                    table.merge(aggregate_record(&record));
                    records += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Archive stream error in '{}' after {} records: {}",
                        path.display(),
                        records,
                        e
                    );
                    break;
                }
            }
        }

        tracing::info!(
            "Aggregated {} response records into {} rows",
            records,
            table.len()
        );
        Ok(table)
    }

    /// Creates the working directories if absent
    fn bootstrap_dirs(&self) -> Result<()> {
        for dir in self.config.storage.all_dirs() {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Joins a listing key onto the base URL
fn join_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}
