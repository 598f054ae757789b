//! Citymesh CLI - Command-line interface for Citymesh
//!
//! Builds a proximity graph from a city CSV and answers questions about
//! it: statistics, what lies around a point, routes between cities. The
//! same graph can be served to map clients over WebSocket.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::Matcher;
use config::Config;

#[derive(Parser)]
#[command(name = "citymesh")]
#[command(author = "Citymesh Contributors")]
#[command(version)]
#[command(about = "Proximity graphs of the world's cities", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./citymesh.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Dataset and graph parameters shared by the graph commands.
#[derive(Args)]
struct GraphArgs {
    /// City CSV to read
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Link cities at most this many kilometres apart
    #[arg(long)]
    max_distance: Option<f64>,

    /// Keep cities with strictly more inhabitants than this
    #[arg(long)]
    min_population: Option<u64>,
}

/// A circle on the map.
#[derive(Args)]
struct RegionArgs {
    /// Latitude of the centre, in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude of the centre, in degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Radius in kilometres
    #[arg(short, long)]
    radius: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show node, link and component counts
    Stats {
        #[command(flatten)]
        graph: GraphArgs,

        /// How many of the largest components to list
        #[arg(long, default_value = "5")]
        components: usize,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// List cities around a point
    Nodes {
        #[command(flatten)]
        graph: GraphArgs,

        #[command(flatten)]
        region: RegionArgs,

        /// Output as JSON, including marker sizes
        #[arg(long)]
        json: bool,
    },

    /// List links around a point
    Edges {
        #[command(flatten)]
        graph: GraphArgs,

        #[command(flatten)]
        region: RegionArgs,

        /// Output as JSON, including map segments
        #[arg(long)]
        json: bool,
    },

    /// Find the shortest route between two cities
    Route {
        /// Starting city, e.g. "Barcelona, es"
        source: String,

        /// Destination city
        destination: String,

        /// Name matching metric
        #[arg(long, value_enum, default_value_t = Matcher::Levenshtein)]
        similarity: Matcher,

        #[command(flatten)]
        graph: GraphArgs,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show which city a name resolves to
    Resolve {
        /// Free-text city name
        text: String,

        /// Name matching metric
        #[arg(long, value_enum, default_value_t = Matcher::Levenshtein)]
        similarity: Matcher,

        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Start the Citymesh server
    Serve {
        #[command(flatten)]
        graph: GraphArgs,

        /// Port to listen on (defaults to the config file's port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Headless mode: bind to 0.0.0.0 for remote access
        #[arg(long)]
        headless: bool,
    },
}

fn resolve_config(path: Option<&Path>, graph: GraphArgs) -> Result<Config, Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    let mut config = Config::discover(path, &cwd)?;
    config.apply(graph.dataset, graph.max_distance, graph.min_population);
    debug!(
        "Dataset {} (max {} km, population > {})",
        config.dataset.display(),
        config.params.max_distance_km,
        config.params.min_population
    );
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Stats {
            graph,
            components,
            json,
        } => commands::stats(&resolve_config(config_path, graph)?, components, json),
        Commands::Nodes {
            graph,
            region,
            json,
        } => commands::nodes(
            &resolve_config(config_path, graph)?,
            region.lat,
            region.lon,
            region.radius,
            json,
        ),
        Commands::Edges {
            graph,
            region,
            json,
        } => commands::edges(
            &resolve_config(config_path, graph)?,
            region.lat,
            region.lon,
            region.radius,
            json,
        ),
        Commands::Route {
            source,
            destination,
            similarity,
            graph,
            json,
        } => commands::route(
            &resolve_config(config_path, graph)?,
            &source,
            &destination,
            similarity,
            json,
        ),
        Commands::Resolve {
            text,
            similarity,
            graph,
        } => commands::resolve(&resolve_config(config_path, graph)?, &text, similarity),
        Commands::Serve {
            graph,
            port,
            headless,
        } => {
            let config = resolve_config(config_path, graph)?;
            let port = port.unwrap_or(config.port);
            commands::serve(&config, port, headless).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_coordinates_parse() {
        let cli = Cli::try_parse_from([
            "citymesh", "nodes", "--lat", "-33.9", "--lon", "-70.6", "--radius", "100",
        ])
        .unwrap();
        match cli.command {
            Commands::Nodes { region, .. } => {
                assert_eq!(region.lat, -33.9);
                assert_eq!(region.lon, -70.6);
            }
            _ => panic!("expected the nodes command"),
        }
    }

    #[test]
    fn test_resolve_with_jaro_winkler() {
        let cli = Cli::try_parse_from([
            "citymesh",
            "resolve",
            "Barcelona",
            "--similarity",
            "jaro-winkler",
        ])
        .unwrap();
        match cli.command {
            Commands::Resolve { similarity, .. } => assert_eq!(similarity, Matcher::JaroWinkler),
            _ => panic!("expected the resolve command"),
        }
    }

    #[test]
    fn test_route_with_overrides() {
        let cli = Cli::try_parse_from([
            "citymesh",
            "route",
            "Barcelona, es",
            "Madrid, es",
            "--max-distance",
            "400",
            "--min-population",
            "50000",
        ])
        .unwrap();
        match cli.command {
            Commands::Route {
                source,
                similarity,
                graph,
                ..
            } => {
                assert_eq!(source, "Barcelona, es");
                assert_eq!(similarity, Matcher::Levenshtein);
                assert_eq!(graph.max_distance, Some(400.0));
                assert_eq!(graph.min_population, Some(50_000));
            }
            _ => panic!("expected the route command"),
        }
    }
}
