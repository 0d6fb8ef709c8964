use serde::Deserialize;

/// Main configuration structure for crawlstats
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub job: JobConfig,
    pub source: SourceConfig,
    pub storage: StorageConfig,
}

/// Job scoping configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Run date the statistics and ledger are scoped to (YYYYMMDD);
    /// defaults to today when absent
    #[serde(rename = "run-date", default)]
    pub run_date: Option<String>,

    /// Number of listed archives to process in one invocation
    #[serde(rename = "files-per-run", default = "default_files_per_run")]
    pub files_per_run: u32,
}

/// Archive source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL archive keys are joined onto
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Paths manifest listing archive keys (local path or URL,
    /// optionally gzip-compressed)
    #[serde(default)]
    pub manifest: Option<String>,

    /// Single archive URL to process instead of the manifest listing
    #[serde(rename = "unloading-url", default)]
    pub unloading_url: Option<String>,
}

/// Working directory configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory receiving compressed downloads
    #[serde(rename = "source-dir")]
    pub source_dir: String,

    /// Directory receiving decompressed archives
    #[serde(rename = "extracted-dir")]
    pub extracted_dir: String,

    /// Directory receiving the partitioned table output
    #[serde(rename = "destination-dir")]
    pub destination_dir: String,

    /// Directory holding the per-run-date statistics ledgers
    #[serde(rename = "statistics-dir")]
    pub statistics_dir: String,
}

fn default_files_per_run() -> u32 {
    1
}

impl JobConfig {
    /// The effective run date: configured value, or today in YYYYMMDD
    pub fn resolved_run_date(&self) -> String {
        match &self.run_date {
            Some(date) => date.clone(),
            None => chrono::Utc::now().format("%Y%m%d").to_string(),
        }
    }
}

impl StorageConfig {
    /// All working directories, for bootstrap
    pub fn all_dirs(&self) -> [&str; 4] {
        [
            &self.source_dir,
            &self.extracted_dir,
            &self.destination_dir,
            &self.statistics_dir,
        ]
    }
}
