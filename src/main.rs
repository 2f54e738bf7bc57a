//! Lexicrawl main entry point
//!
//! This is the command-line interface for the Lexicrawl site search engine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use lexicrawl::config::{load_config, Config};
use lexicrawl::output::print_statistics;
use lexicrawl::SearchApi;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Lexicrawl: a lemma-indexing site search engine
///
/// Lexicrawl crawls the sites listed in its configuration, indexes the
/// normalized word forms found on every page, and answers free-text
/// queries against that index.
#[derive(Parser, Debug)]
#[command(name = "lexicrawl")]
#[command(version)]
#[command(about = "A lemma-indexing site search engine", long_about = None)]
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

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl and index every configured site (Ctrl-C stops the crawl)
    Index,

    /// Fetch and index a single page of a configured site
    IndexPage {
        /// Absolute URL of the page
        url: String,
    },

    /// Search the index
    Search {
        /// Free-text query
        query: String,

        /// Restrict the search to the site with this root URL
        #[arg(long)]
        site: Option<String>,

        /// Number of results to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Maximum number of results to show
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show per-site index statistics
    Stats {
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded: {} sites", config.sites.len());

    match cli.command {
        Command::Index => handle_index(config).await,
        Command::IndexPage { url } => handle_index_page(config, &url).await,
        Command::Search {
            query,
            site,
            offset,
            limit,
            json,
        } => handle_search(config, &query, site.as_deref(), offset, limit, json),
        Command::Stats { json } => handle_stats(config, json),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lexicrawl=info,warn"),
            1 => EnvFilter::new("lexicrawl=debug,info"),
            2 => EnvFilter::new("lexicrawl=trace,debug"),
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

fn open_api(config: Config) -> anyhow::Result<SearchApi> {
    let path = config.storage.database_path.clone();
    SearchApi::from_config(config).with_context(|| format!("Failed to open index {}", path))
}

/// Handles the index command: crawls every site until done or interrupted
async fn handle_index(config: Config) -> anyhow::Result<()> {
    let api = open_api(config)?;

    let recovered = api.indexing().recover_interrupted_sites()?;
    if recovered > 0 {
        tracing::warn!("Marked {} interrupted sites as failed", recovered);
    }

    let response = api.start_indexing().await;
    if let Some(error) = response.error_message {
        anyhow::bail!(error);
    }

    tokio::select! {
        _ = api.wait_until_idle(Duration::from_millis(500)) => {
            tracing::info!("Indexing finished");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            tracing::info!("Stopping indexing...");
            let response = api.stop_indexing().await;
            if let Some(error) = response.error_message {
                anyhow::bail!(error);
            }
            tracing::info!("Indexing stopped");
        }
    }

    print_statistics_response(&api);
    Ok(())
}

/// Handles the index-page command
async fn handle_index_page(config: Config, url: &str) -> anyhow::Result<()> {
    let api = open_api(config)?;
    let response = api.index_page(url).await;
    if let Some(error) = response.error_message {
        anyhow::bail!(error);
    }
    println!("✓ Indexed {}", url);
    Ok(())
}

/// Handles the search command
fn handle_search(
    config: Config,
    query: &str,
    site: Option<&str>,
    offset: usize,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let api = open_api(config)?;
    let response = api.search(query, site, offset, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if let Some(error) = response.error_message {
        anyhow::bail!(error);
    }

    println!("{} results for \"{}\"\n", response.count, query);
    for (i, item) in response.items.iter().enumerate() {
        println!("{}. {} [{:.3}]", offset + i + 1, item.title, item.relevance);
        println!(
            "   {}{} ({})",
            item.site.trim_end_matches('/'),
            item.uri,
            item.site_name
        );
        println!("   {}", item.snippet);
    }
    Ok(())
}

/// Handles the stats command
fn handle_stats(config: Config, json: bool) -> anyhow::Result<()> {
    let database = config.storage.database_path.clone();
    let api = open_api(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&api.statistics())?);
        return Ok(());
    }

    println!("Database: {}\n", database);
    print_statistics_response(&api);
    Ok(())
}

fn print_statistics_response(api: &SearchApi) {
    let response = api.statistics();
    match response.statistics {
        Some(stats) => print_statistics(&stats),
        None => tracing::error!(
            "Failed to load statistics: {}",
            response.error_message.unwrap_or_default()
        ),
    }
}
