//! Rep-Roster main entry point
//!
//! This is the command-line interface for the Rep-Roster listing harvester.

use anyhow::Context;
use clap::Parser;
use rep_roster::config::{load_config_or_default, Config};
use rep_roster::crawler::harvest;
use rep_roster::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rep-Roster: a paginated user-listing harvester
///
/// Rep-Roster discovers how many pages a user listing has, fetches them
/// concurrently and writes one CSV line per user.
#[derive(Parser, Debug)]
#[command(name = "rep-roster")]
#[command(version)]
#[command(about = "A paginated user-listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the output file path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match load_config_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context("invalid configuration");
        }
    };

    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_harvest(config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rep_roster=info,warn"),
            1 => EnvFilter::new("rep_roster=debug,info"),
            2 => EnvFilter::new("rep_roster=trace,debug"),
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
    println!("=== Rep-Roster Dry Run ===\n");

    println!("Site:");
    println!("  Root URL: {}", config.site.root_url);
    println!("  Page URL: {}", config.site.page_url_template);

    println!("\nCrawler:");
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Record cap: {}", config.crawler.record_cap);
    println!("  Records per page: {}", config.crawler.records_per_page);
    println!("  Page budget: {}", config.crawler.page_budget());

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  Escape quotes: {}", config.output.escape_quotes);

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, quiet: bool) -> anyhow::Result<()> {
    tracing::info!("Harvesting {}", config.site.root_url);

    match harvest(config).await {
        Ok(report) => {
            tracing::info!(
                "Harvest completed: {} records written to {}",
                report.stats.records,
                report.output_path.display()
            );
            if !quiet {
                print_statistics(&report.stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e).context("harvest failed")
        }
    }
}
