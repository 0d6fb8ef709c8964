//! Crawlstats main entry point
//!
//! This is the command-line interface for the crawlstats batch pipeline.

use clap::Parser;
use crawlstats::config::{load_config_with_hash, validate_run_date};
use crawlstats::job::{run_job, RunOutcome};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Crawlstats: robots.txt directive statistics from web archives
///
/// Crawlstats downloads robots.txt response archives, counts Allow/Disallow
/// directives per domain and user agent, writes date-partitioned tables, and
/// keeps a per-run-date ledger so no archive is ever counted twice.
#[derive(Parser, Debug)]
#[command(name = "crawlstats")]
#[command(version = "1.0.0")]
#[command(about = "Robots.txt directive statistics from web archives", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Run date to scope statistics and idempotency to (YYYYMMDD)
    #[arg(long, value_name = "YYYYMMDD")]
    run_date: Option<String>,

    /// Process exactly this archive URL instead of the configured listing
    #[arg(long, value_name = "URL")]
    unloading_url: Option<String>,

    /// Number of listed archives to process in this invocation
    #[arg(long, value_name = "N")]
    files_per_run: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be processed without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Apply CLI overrides on top of the file configuration
    if let Some(run_date) = cli.run_date {
        validate_run_date(&run_date)?;
        config.job.run_date = Some(run_date);
    }
    if let Some(url) = cli.unloading_url {
        url::Url::parse(&url)?;
        config.source.unloading_url = Some(url);
    }
    if let Some(files_per_run) = cli.files_per_run {
        anyhow::ensure!(files_per_run >= 1, "--files-per-run must be >= 1");
        config.job.files_per_run = files_per_run;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else {
        handle_run(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawlstats=info,warn"),
            1 => EnvFilter::new("crawlstats=debug,info"),
            2 => EnvFilter::new("crawlstats=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &crawlstats::config::Config) {
    println!("=== Crawlstats Dry Run ===\n");

    println!("Job:");
    println!("  Run date: {}", config.job.resolved_run_date());
    println!("  Files per run: {}", config.job.files_per_run);

    println!("\nSource:");
    println!("  Base URL: {}", config.source.base_url);
    match &config.source.unloading_url {
        Some(url) => println!("  Unloading URL: {}", url),
        None => println!(
            "  Manifest: {}",
            config.source.manifest.as_deref().unwrap_or("<none>")
        ),
    }

    println!("\nStorage:");
    println!("  Source dir: {}", config.storage.source_dir);
    println!("  Extracted dir: {}", config.storage.extracted_dir);
    println!("  Destination dir: {}", config.storage.destination_dir);
    println!("  Statistics dir: {}", config.storage.statistics_dir);

    println!("\n✓ Configuration is valid");
    match &config.source.unloading_url {
        Some(url) => println!("✓ Would process 1 archive: {}", url),
        None => println!(
            "✓ Would process up to {} archive(s) from the manifest listing",
            config.job.files_per_run
        ),
    }
}

/// Handles the main job run
async fn handle_run(config: crawlstats::config::Config) -> anyhow::Result<()> {
    match run_job(config).await {
        Ok(RunOutcome::Completed { files_processed }) => {
            tracing::info!("Job completed: {} file(s) processed", files_processed);
            Ok(())
        }
        Ok(RunOutcome::AlreadyProcessed { file_name }) => {
            // Deliberate whole-run stop, not a failure: exit status stays clean.
            tracing::info!(
                "File '{}' was already counted for this run date. Stop job...",
                file_name
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Job failed: {}", e);
            Err(e.into())
        }
    }
}
