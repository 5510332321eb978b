//! Catalog-Ingest main entry point
//!
//! This is the command-line interface for the catalog crawl-and-ingest
//! pipeline.

use anyhow::Context;
use catalog_ingest::config::{load_config_with_hash, parse_config, Config};
use catalog_ingest::crawler::run_ingest;
use catalog_ingest::output::{load_statistics, print_report, print_statistics};
use catalog_ingest::storage::open_catalog;
use catalog_ingest::IngestError;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Catalog-Ingest: crawl a product catalog into a local store
///
/// Walks the configured entry page, its category pages and their
/// subcategory pages, and upserts every product found together with
/// normalized copies of its photos. With no CONFIG, built-in defaults
/// are used.
#[derive(Parser, Debug)]
#[command(name = "catalog-ingest")]
#[command(version)]
#[command(about = "Crawl a product catalog into a local store", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show catalog statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load(cli.config.as_deref())?;

    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_ingest(&config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_ingest=info,warn"),
            1 => EnvFilter::new("catalog_ingest=debug,info"),
            2 => EnvFilter::new("catalog_ingest=trace,debug"),
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

/// Loads the configuration file, or the defaults when none is given
fn load(path: Option<&Path>) -> anyhow::Result<(Config, String)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, hash))
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Ok((parse_config("")?, "defaults".to_string()))
        }
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Catalog-Ingest Dry Run ===\n");

    println!("Source:");
    println!("  Entry URL: {}", config.source.entry_url);
    println!("  Category selector: {}", config.source.category_selector);
    println!("  Subcategory selector: {}", config.source.subcategory_selector);

    println!("\nProduct Blocks:");
    println!("  Section: {}", config.products.section_selector);
    println!("  Title: {}", config.products.title_selector);
    println!("  Description: {}", config.products.description_selector);
    println!("  Features: {}", config.products.feature_selector);
    println!("  Image: {}", config.products.image_selector);
    println!("  Carousel: {}", config.products.carousel_selector);

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Pacing delay: {}ms", config.fetcher.pacing_delay_ms);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);

    println!("\nImages:");
    println!(
        "  Canvas: {}x{}",
        config.images.canvas_width, config.images.canvas_height
    );
    println!("  Storage root: {}", config.images.storage_root);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_catalog(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main ingest run
async fn handle_ingest(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!("Starting ingest from {}", config.source.entry_url);

    let report = match run_ingest(config, config_hash).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Ingest failed: {}", e);
            return Err(e.into());
        }
    };

    print_report(&report);

    if report.is_clean() {
        tracing::info!("Ingest completed successfully");
        Ok(())
    } else {
        Err(IngestError::IncompleteRun {
            failures: report.failures.len(),
        }
        .into())
    }
}
