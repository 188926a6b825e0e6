//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest page harvester.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use sumi_harvest::config::{load_config_with_hash, Config};
use sumi_harvest::crawler::{target_url, Coordinator};
use sumi_harvest::output::{render_partitions, render_records, write_output, OutputFormat};
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: fetch one page per query, enrich it, and keep the result
///
/// Each query fetches the configured target page, extracts its title and
/// summary, looks the title up for a canonical link, and stores the record
/// under the query so it can be shown again later.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Fetch, enrich and store one page per query", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["query", "show", "list", "dry_run"]),
))]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Run a job for QUERY, then show everything stored under it
    #[arg(long, value_name = "QUERY")]
    query: Option<String>,

    /// Show records stored under QUERY without fetching anything
    #[arg(long, value_name = "QUERY")]
    show: Option<String>,

    /// List stored query terms with record counts
    #[arg(long)]
    list: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    let coordinator = Coordinator::from_config(config)?;

    let rendered = if let Some(query) = &cli.query {
        handle_query(&coordinator, query, cli.format).await?
    } else if let Some(query) = &cli.show {
        handle_show(&coordinator, query, cli.format)?
    } else {
        render_partitions(&coordinator.partitions()?, cli.format)?
    };

    emit(&rendered, cli.output.as_deref())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles --dry-run: shows the validated configuration
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Sumi-Harvest Dry Run ===\n");

    println!("Target:");
    println!("  URL template: {}", config.target.url_template);
    println!("  Title selector: {}", config.target.title_selector);
    println!("  Summary selector: {}", config.target.summary_selector);
    println!("  Require summary: {}", config.target.require_summary);
    println!("  Request timeout: {}s", config.target.request_timeout_secs);

    println!("\nEnrichment:");
    if config.enrichment.enabled {
        println!("  API URL: {}", config.enrichment.api_url);
        println!("  Sentences: {}", config.enrichment.sentences);
    } else {
        println!("  Disabled");
    }

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nStorage:");
    println!("  Backend: {:?}", config.storage.backend);
    println!("  Path: {}", config.storage.path);

    let example = target_url(&config.target.url_template, "Turing_Award")?;
    println!("\n✓ Configuration is valid");
    println!("✓ Query 'Turing_Award' would fetch {}", example);

    Ok(())
}

/// Handles --query: runs one job, then reads back the whole partition
async fn handle_query(
    coordinator: &Coordinator,
    query: &str,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    if query.trim().is_empty() {
        return Err("--query needs a non-empty query term".into());
    }

    let result = coordinator.run(query).await?;

    if let Some(failure) = &result.failure {
        let message = format!(
            "Job for '{}' failed ({}): {}",
            result.query,
            failure.kind(),
            failure
        );
        tracing::error!("{}", message);
        return Err(message.into());
    }

    tracing::info!("Job for '{}' finished: {}", result.query, result.status);

    let records = coordinator.records_for(&result.query)?;
    Ok(render_records(&result.query, &records, format)?)
}

/// Handles --show: reads a partition without running a job
fn handle_show(
    coordinator: &Coordinator,
    query: &str,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let query = query.trim();
    let records = coordinator.records_for(query)?;
    Ok(render_records(query, &records, format)?)
}

fn emit(rendered: &str, output: Option<&std::path::Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            write_output(rendered, path)?;
            tracing::info!("Output written to: {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
