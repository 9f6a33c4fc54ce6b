//! Shutter-Sweep main entry point
//!
//! This is the command-line interface for the Shutter-Sweep photo locator
//! harvester.

use anyhow::Context;
use clap::Parser;
use shutter_sweep::config::{load_config_with_hash, Config};
use shutter_sweep::crawler::{crawl, Coordinator};
use shutter_sweep::output::{load_statistics, print_statistics};
use shutter_sweep::url::LocatorRules;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shutter-Sweep: a resumable photo locator harvester
///
/// Shutter-Sweep renders each item page from a dataset of (owner, item)
/// pairs, captures the photo the page loads, upgrades small renditions to
/// their full-size variant and appends the results to a CSV store. Items
/// already resolved by earlier runs are skipped.
#[derive(Parser, Debug)]
#[command(name = "shutter-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A resumable photo locator harvester", long_about = None)]
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

    /// Validate config and show the backlog without resolving anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the record store and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shutter_sweep=info,warn"),
            1 => EnvFilter::new("shutter_sweep=debug,info"),
            2 => EnvFilter::new("shutter_sweep=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be resolved
fn handle_dry_run(config: Config) -> anyhow::Result<()> {
    println!("=== Shutter-Sweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Flush threshold: {}", config.crawler.flush_threshold);
    match config.crawler.item_timeout_secs {
        0 => println!("  Item timeout: disabled"),
        secs => println!("  Item timeout: {}s", secs),
    }

    println!("\nResolver:");
    println!("  Page template: {}", config.resolver.page_template);
    println!(
        "  Image extensions: {}",
        config.resolver.image_extensions.join(", ")
    );
    println!("  Small suffix: {}", config.resolver.small_suffix);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nFiles:");
    println!("  Dataset: {}", config.input.dataset_path);
    println!("  Store: {}", config.output.store_path);
    if let Some(seed) = &config.output.seed_path {
        println!("  Seed: {}", seed);
    }

    let coordinator = Coordinator::with_http(config)?;
    let plan = coordinator.plan()?;

    println!("\nDataset:");
    println!("  Rows: {}", plan.dataset_rows);
    if plan.unreadable_rows > 0 {
        println!("  Unreadable rows: {}", plan.unreadable_rows);
    }
    println!("  Missing user or id: {}", plan.backlog.missing_fields);
    println!(
        "  Already resolved: {}{}",
        plan.backlog.already_completed,
        if plan.from_seed { " (from seed)" } else { "" }
    );

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would resolve {} items with concurrency {}",
        plan.backlog.items.len(),
        coordinator.config().crawler.concurrency
    );

    Ok(())
}

/// Handles the --stats mode: shows statistics from the record store
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = Path::new(&config.output.store_path);
    println!("Store: {}\n", store.display());

    let rules = LocatorRules::from_config(&config.resolver);
    let stats = load_statistics(store, &rules)
        .with_context(|| format!("Failed to read record store {}", store.display()))?;

    print_statistics(&stats);

    Ok(())
}

/// Handles the main enrichment run
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Resolving {} with concurrency {}",
        config.input.dataset_path,
        config.crawler.concurrency
    );

    match crawl(config).await {
        Ok(report) => {
            if report.seeded {
                tracing::info!("Store was seeded from cleaned output");
            }
            tracing::info!("Run completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
