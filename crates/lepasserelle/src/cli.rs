// CLI Interface
//
// This module provides the command-line interface for LeRegard.

use crate::config::{LeRegardConfig, SNAPSHOT_ENV};
use crate::errors::{format_error, LeRegardError};
use crate::leregard::LeRegard;
use anyhow::Context;
use anyhow::Result as AnyhowResult;
use clap::{Parser, Subcommand};
use legraphe::Image;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// LeRegard - Image Search and Discovery over a Metadata Graph
#[derive(Parser, Debug)]
#[command(name = "leregard")]
#[command(author = "LeRegard Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search images by keyword and discover related images through shared metadata", long_about = None)]
pub struct Cli {
    /// Graph snapshot to query
    #[arg(global = true, long = "snapshot", short = 's', env = "LEREGARD_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Configuration file (defaults to .leregard/config.toml)
    #[arg(global = true, long = "config", short = 'c')]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(global = true, long = "json")]
    pub json: bool,

    /// Enable verbose logging
    #[arg(global = true, long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search images by keyword
    Search {
        /// Free-text keyword
        #[arg(value_name = "KEYWORD")]
        keyword: String,
    },

    /// Discover images related to seed images
    Discover {
        /// Seed image keys
        #[arg(value_name = "KEY", required = true)]
        seeds: Vec<String>,
    },

    /// Show one image with its captions, tags and similar images
    Info {
        /// Image key
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Build a visualization subgraph
    Visualize {
        /// Seed image keys
        #[arg(value_name = "KEY", required_unless_present = "search")]
        seeds: Vec<String>,

        /// Build the subgraph of a keyword search instead
        #[arg(long = "search", value_name = "KEYWORD", conflicts_with = "seeds")]
        search: Option<String>,
    },

    /// Show vertex and edge counts
    Metrics,

    /// Suggest random keywords from one image
    Surprise,
}

impl Cli {
    /// Run the CLI
    pub async fn run(self) -> AnyhowResult<()> {
        init_logging_impl(self.verbose);

        let config = load_config(self.config.as_ref())?;
        let snapshot = self.snapshot.with_context(|| {
            format!(
                "No graph snapshot given. Pass --snapshot <FILE> or set {}",
                SNAPSHOT_ENV
            )
        })?;

        let (leregard, report) = LeRegard::open_snapshot(&snapshot, config).map_err(report_error)?;
        debug!(
            "Snapshot restored: {} vertices, {} edges, {} skipped",
            report.vertices_inserted,
            report.edges_inserted,
            report.skipped_edges.len()
        );

        let output = Output { json: self.json };
        match self.command {
            Commands::Search { keyword } => cmd_search_impl(&leregard, &output, keyword).await,
            Commands::Discover { seeds } => cmd_discover_impl(&leregard, &output, seeds).await,
            Commands::Info { key } => cmd_info_impl(&leregard, &output, key).await,
            Commands::Visualize { seeds, search } => {
                cmd_visualize_impl(&leregard, seeds, search).await
            }
            Commands::Metrics => cmd_metrics_impl(&leregard, &output).await,
            Commands::Surprise => cmd_surprise_impl(&leregard, &output).await,
        }
    }
}

/// Initialize logging implementation
///
/// `RUST_LOG` wins over `--verbose` when set.
fn init_logging_impl(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Configuration from an explicit file or the working directory
fn load_config(explicit: Option<&PathBuf>) -> AnyhowResult<LeRegardConfig> {
    match explicit {
        Some(path) => LeRegardConfig::load_file(path),
        None => {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            LeRegardConfig::load(current_dir)
        }
    }
}

fn report_error(error: LeRegardError) -> anyhow::Error {
    anyhow::anyhow!(format_error(&error))
}

struct Output {
    json: bool,
}

impl Output {
    fn print_json<T: Serialize>(&self, value: &T) -> AnyhowResult<()> {
        let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
        println!("{}", text);
        Ok(())
    }

    fn print_images(&self, heading: &str, images: &[Image]) -> AnyhowResult<()> {
        if self.json {
            return self.print_json(&images);
        }
        if images.is_empty() {
            println!("No images found for: {}", heading);
            return Ok(());
        }

        println!("\nFound {} image(s) for: '{}'\n", images.len(), heading);
        for (i, image) in images.iter().enumerate() {
            println!("{}. {} by {}", i + 1, image.key, image.author);
            println!("   URL: {}", image.url);
        }
        Ok(())
    }
}

/// Search command implementation
async fn cmd_search_impl(leregard: &LeRegard, output: &Output, keyword: String) -> AnyhowResult<()> {
    info!("Searching for: {}", keyword);
    let images = leregard.search(&keyword).await.map_err(report_error)?;
    output.print_images(&keyword, &images)
}

/// Discover command implementation
async fn cmd_discover_impl(leregard: &LeRegard, output: &Output, seeds: Vec<String>) -> AnyhowResult<()> {
    info!("Discovering from {} seed(s)", seeds.len());
    let heading = seeds.join(", ");
    let images = leregard.discover(seeds).await.map_err(report_error)?;
    output.print_images(&heading, &images)
}

/// Info command implementation
async fn cmd_info_impl(leregard: &LeRegard, output: &Output, key: String) -> AnyhowResult<()> {
    let detail = leregard.image_detail(&key).await.map_err(report_error)?;
    let Some(detail) = detail else {
        println!("No image with key: {}", key);
        return Ok(());
    };

    if output.json {
        return output.print_json(&detail);
    }

    println!("\nImage {}\n", detail.image.key);
    println!("Author: {}", detail.image.author);
    println!("URL: {}", detail.image.url);
    if !detail.best_guesses.is_empty() {
        println!("Best guesses: {}", detail.best_guesses.join(", "));
    }
    println!("\nTags:");
    for tag in &detail.tags {
        println!("  {:<24} {:.2}", tag.tag, tag.score);
    }
    println!("\nSimilar images:");
    for image in &detail.similar {
        println!("  {} by {}", image.key, image.author);
    }
    Ok(())
}

/// Visualize command implementation
///
/// Always prints the renderer-ready node and edge lists as JSON.
async fn cmd_visualize_impl(
    leregard: &LeRegard,
    seeds: Vec<String>,
    search: Option<String>,
) -> AnyhowResult<()> {
    let subgraph = match search {
        Some(keyword) => leregard.search_subgraph(&keyword).await,
        None => leregard.visualize(seeds).await,
    }
    .map_err(report_error)?;

    info!(
        "Subgraph has {} node(s) and {} edge(s)",
        subgraph.nodes.len(),
        subgraph.edges.len()
    );
    Output { json: true }.print_json(&subgraph)
}

/// Metrics command implementation
async fn cmd_metrics_impl(leregard: &LeRegard, output: &Output) -> AnyhowResult<()> {
    let metrics = leregard.metrics().await.map_err(report_error)?;
    if output.json {
        return output.print_json(&metrics);
    }

    println!("\nLeRegard Graph Metrics\n");
    println!("Vertices:");
    println!("  Images: {}", metrics.images);
    println!("  Authors: {}", metrics.authors);
    println!("  Tags: {}", metrics.tags);
    println!("  Best guesses: {}", metrics.guesses);
    println!("Edges: {}", metrics.edges);
    Ok(())
}

/// Surprise command implementation
async fn cmd_surprise_impl(leregard: &LeRegard, output: &Output) -> AnyhowResult<()> {
    let keywords = leregard.surprise().await.map_err(report_error)?;
    if output.json {
        return output.print_json(&keywords);
    }
    match keywords {
        Some(keywords) => println!("{}", keywords),
        None => println!("No keywords available"),
    }
    Ok(())
}

/// Main entry point for the CLI
pub async fn main() -> AnyhowResult<()> {
    let cli = Cli::parse();
    cli.run().await
}
