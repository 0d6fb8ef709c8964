//! Configuration module for crawlstats
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files.
//!
//! # Example
//!
//! ```no_run
//! use crawlstats::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Run date: {}", config.job.resolved_run_date());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, JobConfig, SourceConfig, StorageConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-export validation helpers used by CLI overrides
pub use validation::validate_run_date;
