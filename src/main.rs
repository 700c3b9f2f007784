//! LyngSat Wayback main entry point
//!
//! This is the command-line interface for the archived channel catalog crawler.

use anyhow::Context;
use clap::Parser;
use lyngsat_wayback::archive::resolve_roots;
use lyngsat_wayback::config::{load_config_with_hash, Config};
use lyngsat_wayback::crawler::{run_crawl, HttpGateway};
use lyngsat_wayback::storage::{SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// LyngSat Wayback: rebuilds historical channel listings from archive snapshots
///
/// Walks each archived capture from the site root through the free TV index,
/// its regions and countries, down to every channel table and detail page,
/// and stores one tree per capture for later export.
#[derive(Parser, Debug)]
#[command(name = "lyngsat-wayback")]
#[command(version = "1.0.0")]
#[command(about = "Archived satellite channel catalog crawler", long_about = None)]
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

    /// Re-crawl snapshots that are already stored as complete
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without fetching anything
    #[arg(long, conflicts_with_all = ["discover", "stats", "export_csv", "export_summary"])]
    dry_run: bool,

    /// Resolve and list the snapshot roots, then exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export_csv", "export_summary"])]
    discover: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "discover", "export_csv", "export_summary"])]
    stats: bool,

    /// Flatten stored snapshots into the CSV report and exit
    #[arg(long, conflicts_with_all = ["dry_run", "discover", "stats", "export_summary"])]
    export_csv: bool,

    /// Generate markdown summary from existing data and exit
    #[arg(long, conflicts_with_all = ["dry_run", "discover", "stats", "export_csv"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.discover {
        handle_discover(&config).await?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_csv {
        handle_export_csv(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        handle_crawl(&config, &config_hash, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lyngsat_wayback=info,warn"),
            1 => EnvFilter::new("lyngsat_wayback=debug,info"),
            2 => EnvFilter::new("lyngsat_wayback=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== LyngSat Wayback Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Concurrency: {}", config.crawler.concurrency);
    match config.crawler.max_regions {
        Some(n) => println!("  Max regions: {}", n),
        None => println!("  Max regions: unlimited"),
    }
    match config.crawler.max_countries_per_region {
        Some(n) => println!("  Max countries per region: {}", n),
        None => println!("  Max countries per region: unlimited"),
    }
    println!("  Detail retries: {}", config.crawler.detail_retries);

    println!("\nFetch Gateway:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Max retries: {}", config.http.max_retries);
    println!(
        "  Max concurrent fetches: {}",
        config.http.max_concurrent_fetches
    );
    match &config.proxy {
        Some(proxy) => println!("  Proxy: {}", proxy.url),
        None => println!("  Proxy: none"),
    }

    println!("\nArchive:");
    println!("  Host: {}", config.archive.host);
    println!("  Range: {} to {}", config.archive.from, config.archive.to_date());
    if config.archive.roots.is_empty() {
        println!("  Roots: resolved from the archive index");
    } else {
        println!("  Roots ({}):", config.archive.roots.len());
        for root in &config.archive.roots {
            println!("    * {}", root);
        }
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  CSV: {}", config.output.csv_path);
    println!("  Summary: {}", config.output.summary_path);
    if let Some(dir) = &config.output.json_dir {
        println!("  JSON: {}", dir);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --discover mode: resolves snapshot roots without crawling them
async fn handle_discover(config: &Config) -> anyhow::Result<()> {
    let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let gateway = HttpGateway::new(&config.http, config.proxy.as_ref())?;

    let (roots, source) = resolve_roots(config, &mut storage, gateway.client())
        .await
        .context("resolving snapshot roots")?;

    println!("{} snapshot roots ({:?}):", roots.len(), source);
    for root in &roots {
        let status = storage
            .snapshot_status(&lyngsat_wayback::url::snapshot_id(root))?
            .map(|s| s.to_db_string())
            .unwrap_or("pending");
        println!("  {} [{}]", root, status);
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use lyngsat_wayback::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-csv mode: flattens every stored snapshot
fn handle_export_csv(config: &Config) -> anyhow::Result<()> {
    use lyngsat_wayback::output::export_csv;

    println!("=== Exporting Channel CSV ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.csv_path);
    println!();

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    tracing::info!("Loading snapshots from database...");
    let snapshots = storage.load_all_snapshots()?;

    let rows = export_csv(&snapshots, &config.site, Path::new(&config.output.csv_path))
        .with_context(|| format!("writing {}", config.output.csv_path))?;

    println!(
        "✓ {} rows from {} snapshots exported to: {}",
        rows,
        snapshots.len(),
        config.output.csv_path
    );

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    use lyngsat_wayback::output::generate_markdown_summary;

    println!("=== Exporting Crawl Summary ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    tracing::info!("Loading crawl data from database...");
    let summaries = storage.list_snapshots()?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summaries, Path::new(&config.output.summary_path))?;

    println!("✓ Summary exported to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (re-crawling complete snapshots)");
    } else {
        tracing::info!("Starting crawl (complete snapshots are skipped)");
    }

    let report = match run_crawl(config, config_hash, fresh).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    for id in &report.needs_reprocessing {
        tracing::warn!("Snapshot {} needs reprocessing", id);
    }

    handle_export_summary(config)?;

    Ok(())
}
