//! Crawlstats: robots.txt directive statistics from web archives
//!
//! This crate implements a batch pipeline that ingests compressed WARC files
//! of captured robots.txt responses, counts Allow/Disallow directives per
//! domain and user agent, and rolls the counts into daily run statistics with
//! an append-only ledger guarding against double-counting.

pub mod aggregate;
pub mod config;
pub mod fetch;
pub mod job;
pub mod output;
pub mod stats;
pub mod warc;

use thiserror::Error;

/// Main error type for crawlstats operations
#[derive(Debug, Error)]
pub enum CrawlstatsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Archive error: {0}")]
    Warc(#[from] warc::WarcError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] stats::LedgerError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Cannot derive a file name from URL: {0}")]
    BadArchiveUrl(String),

    #[error("Empty archive listing from manifest: {0}")]
    EmptyListing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid run date: {0}")]
    InvalidRunDate(String),
}

/// Result type alias for crawlstats operations
pub type Result<T> = std::result::Result<T, CrawlstatsError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use aggregate::{classify_line, AggregateCounts, AggregateKey, ArchiveTable, Directive};
pub use config::Config;
pub use job::{JobRunner, RunOutcome};
pub use stats::{RunLedger, StatisticsRow};
pub use warc::{ResponseRecord, WarcReader};
