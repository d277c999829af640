//! Catalog-Sync main entry point
//!
//! This is the command-line interface for the periodic catalog crawler.

use anyhow::Context;
use catalog_sync::catalog::CatalogService;
use catalog_sync::config::{load_config_with_hash, Config};
use catalog_sync::crawler::{http_walker, Scheduler};
use catalog_sync::notifier::Notifier;
use catalog_sync::output::{
    load_statistics, print_cycle_report, print_products, print_statistics, print_walk_outcome,
};
use catalog_sync::storage::{open_storage, StorageHandle};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Catalog-Sync: keeps a local copy of a retail category listing
///
/// Catalog-Sync walks a paginated product listing on a schedule, reconciles
/// the products it finds into a SQLite database, and announces every change.
#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(version = "1.0.0")]
#[command(about = "A periodic catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run a single crawl cycle and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "list"])]
    once: bool,

    /// Crawl once and print the extracted records without writing to the database
    #[arg(long, conflicts_with_all = ["once", "stats", "list"])]
    dry_run: bool,

    /// Show crawl ledger statistics from the database and exit
    #[arg(long, conflicts_with_all = ["once", "dry_run", "list"])]
    stats: bool,

    /// Print stored products and exit
    #[arg(long, conflicts_with_all = ["once", "dry_run", "stats"])]
    list: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config).await
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.list {
        handle_list(&config)
    } else {
        handle_sync(config, config_hash, cli.once).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_sync=info,warn"),
            1 => EnvFilter::new("catalog_sync=debug,info"),
            2 => EnvFilter::new("catalog_sync=trace,debug"),
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

fn open_catalog(config: &Config) -> anyhow::Result<CatalogService> {
    let path = Path::new(&config.storage.database_path);
    let storage = open_storage(path)
        .with_context(|| format!("failed to open database {}", path.display()))?;
    Ok(CatalogService::new(
        StorageHandle::new(storage),
        Notifier::from_config(&config.notifier),
    ))
}

/// Handles the --dry-run mode: crawls once and prints what was found
async fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Catalog-Sync Dry Run ===\n");
    println!("Start URL: {}", config.crawler.start_url);
    println!("Base URL: {}", config.crawler.base_url);
    println!("Page ceiling: {}\n", config.crawler.max_pages);

    let walker = http_walker(config)?;
    let outcome = walker.walk(&config.crawler.start_url).await;
    print_walk_outcome(&outcome);

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --list mode: prints stored products
fn handle_list(config: &Config) -> anyhow::Result<()> {
    let catalog = open_catalog(config)?;
    print_products(&catalog.list()?);
    Ok(())
}

/// Handles the default and --once modes
async fn handle_sync(config: Config, config_hash: String, once: bool) -> anyhow::Result<()> {
    let catalog = open_catalog(&config)?;

    // Change events go to the log
    let (_, mut events) = catalog.notifier().open_channel();
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            tracing::info!("Change event: {}", event);
        }
    });

    let walker = http_walker(&config)?;
    let scheduler =
        Scheduler::from_config(walker, catalog, &config.crawler).with_config_hash(config_hash);

    if once {
        let report = scheduler.run_cycle().await?;
        print_cycle_report(&report);
        return Ok(());
    }

    let handle = scheduler.spawn();
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    tracing::info!("Received Ctrl+C, stopping scheduler");
    handle.stop().await;

    Ok(())
}
