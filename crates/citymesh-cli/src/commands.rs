//! CLI command implementations.

use crate::config::{Config, CONFIG_FILE};
use citymesh_core::{read_cities, CityRecord, LatLon};
use citymesh_graph::{
    build_snapshot, EdgeView, JaroWinkler, LevenshteinRatio, NameResolver, PopulationView,
    RouteView, Similarity, Snapshot,
};
use citymesh_server::{CitymeshServer, ServerConfig};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::{Duration, Instant};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// How free-text city names are scored against city labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Matcher {
    /// Normalized edit distance
    #[default]
    Levenshtein,
    /// Jaro-Winkler, kinder to shared prefixes
    JaroWinkler,
}

impl Similarity for Matcher {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        match self {
            Matcher::Levenshtein => LevenshteinRatio.similarity(a, b),
            Matcher::JaroWinkler => JaroWinkler.similarity(a, b),
        }
    }
}

/// Write a default config file into a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_path = path.join(CONFIG_FILE);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(path)?;
    fs::write(&config_path, Config::default().to_json()?)?;

    println!("{} Wrote {}", "✓".green(), config_path.display());
    println!(
        "  Point {} at your city CSV, then run {}",
        "dataset".cyan(),
        "citymesh stats".cyan()
    );

    Ok(())
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());
    Ok(spinner)
}

fn load_records(config: &Config) -> Result<Vec<CityRecord>> {
    let spinner = spinner(&format!("Reading {}...", config.dataset.display()))?;
    let records = read_cities(&config.dataset);
    spinner.finish_and_clear();
    Ok(records?)
}

/// Reads the dataset and builds the graph for the configured parameters.
fn load_graph(config: &Config) -> Result<Snapshot> {
    let records = load_records(config)?;

    let start = Instant::now();
    let spinner = spinner("Building graph...")?;
    let graph = build_snapshot(&records, config.params);
    spinner.finish_and_clear();

    eprintln!(
        "{} {} cities, {} links (max {} km, population > {}) in {}ms",
        "✓".green(),
        graph.node_count().to_string().cyan(),
        graph.edge_count().to_string().cyan(),
        config.params.max_distance_km,
        config.params.min_population,
        start.elapsed().as_millis()
    );

    Ok(graph)
}

fn center(lat: f64, lon: f64) -> Result<LatLon> {
    let center = LatLon::new(lat, lon);
    if !center.is_valid() {
        return Err(format!("coordinates out of range: {}, {}", lat, lon).into());
    }
    Ok(center)
}

/// Show graph statistics.
pub fn stats(config: &Config, components: usize, json_output: bool) -> Result<()> {
    let graph = load_graph(config)?;
    let stats = graph.stats();
    let all_components = graph.components();

    if json_output {
        let output = serde_json::json!({
            "params": graph.params(),
            "stats": stats,
            "components": all_components.iter().take(components).collect::<Vec<_>>()
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Citymesh Graph".cyan().bold());
    println!("  Cities:     {}", stats.node_count.to_string().bold());
    println!("  Links:      {}", stats.edge_count.to_string().bold());
    println!("  Components: {}", stats.component_count.to_string().bold());

    if components > 0 && !all_components.is_empty() {
        println!();
        println!("{}", "Largest components:".yellow());
        for component in all_components.iter().take(components) {
            let preview: Vec<_> = component.iter().take(3).map(String::as_str).collect();
            let more = component.len().saturating_sub(preview.len());
            let suffix = if more > 0 {
                format!(" ... and {} more", more)
            } else {
                String::new()
            };
            println!(
                "  {} {}{}",
                format!("[{}]", component.len()).cyan(),
                preview.join(" | "),
                suffix.dimmed()
            );
        }
    }

    Ok(())
}

/// List the cities around a point.
pub fn nodes(config: &Config, lat: f64, lon: f64, radius: f64, json_output: bool) -> Result<()> {
    let center = center(lat, lon)?;
    let graph = load_graph(config)?;
    let nodes = graph.nodes_within(center, radius);

    if json_output {
        let output = serde_json::json!({
            "nodes": nodes.iter().map(|(id, population)| serde_json::json!({
                "id": id,
                "population": population
            })).collect::<Vec<_>>(),
            "view": PopulationView::around(&graph, center, radius, &config.view)
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if nodes.is_empty() {
        println!("No cities within {} km of {}, {}", radius, lat, lon);
        return Ok(());
    }

    println!("Found {} cities within {} km:\n", nodes.len(), radius);
    for (id, population) in nodes {
        println!("  {} {}", id.cyan(), format!("({})", population).dimmed());
    }

    Ok(())
}

/// List the links around a point.
pub fn edges(config: &Config, lat: f64, lon: f64, radius: f64, json_output: bool) -> Result<()> {
    let center = center(lat, lon)?;
    let graph = load_graph(config)?;
    let links = graph.edges_within(center, radius);

    if json_output {
        let output = serde_json::json!({
            "edges": links,
            "view": EdgeView::around(&graph, center, radius)
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if links.is_empty() {
        println!("No links within {} km of {}, {}", radius, lat, lon);
        return Ok(());
    }

    println!("Found {} links within {} km:\n", links.len(), radius);
    for link in links {
        println!(
            "  {} {} {} {}",
            link.source.cyan(),
            "<->".dimmed(),
            link.target.cyan(),
            format!("({:.1} km)", link.distance_km).dimmed()
        );
    }

    Ok(())
}

/// Find the shortest route between two named cities.
pub fn route(
    config: &Config,
    source: &str,
    destination: &str,
    matcher: Matcher,
    json_output: bool,
) -> Result<()> {
    let graph = load_graph(config)?;
    let route = graph.route(&NameResolver::with_similarity(matcher), source, destination)?;

    if json_output {
        let output = serde_json::json!({
            "route": route,
            "view": RouteView::from_route(&graph, &route)
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {:.1} km in {} hops\n",
        "Route:".green().bold(),
        route.distance_km,
        route.hops()
    );
    for (step, city) in route.cities.iter().enumerate() {
        println!("  {:>3}. {}", step + 1, city.cyan());
    }

    Ok(())
}

/// Show which city free text resolves to.
pub fn resolve(config: &Config, text: &str, matcher: Matcher) -> Result<()> {
    let graph = load_graph(config)?;
    let resolver = NameResolver::with_similarity(matcher);

    let Some((index, score)) = resolver.best_match(&graph, text) else {
        println!("The graph has no cities");
        return Ok(());
    };
    let city = graph.get(index).ok_or("resolved city vanished")?;

    if resolver.resolve(&graph, text).is_some() {
        println!(
            "{} {} {}",
            "✓".green(),
            city.id.cyan(),
            format!("(score {:.1})", score).dimmed()
        );
    } else {
        println!(
            "{} No match for \"{}\" (closest: {}, score {:.1})",
            "✗".red(),
            text,
            city.id,
            score
        );
    }

    Ok(())
}

/// Start the Citymesh server.
pub async fn serve(config: &Config, port: u16, headless: bool) -> Result<()> {
    let bind_addr = if headless { [0, 0, 0, 0] } else { [127, 0, 0, 1] };

    if headless {
        println!("{}", "Starting Citymesh server in headless mode...".cyan());
    } else {
        println!("{}", "Starting Citymesh server...".cyan());
    }

    let records = load_records(config)?;
    println!("{} Loaded {} cities", "✓".green(), records.len());

    let addr = SocketAddr::from((bind_addr, port));
    let server_config = ServerConfig {
        addr,
        dataset: config.dataset.clone(),
        params: config.params,
        view: config.view,
    };
    let server = CitymeshServer::with_records(records, server_config);

    println!("{} Listening on ws://{}", "✓".green(), addr);
    if headless {
        println!("  Headless mode: accepting connections from any host");
    }
    println!("  Press {} to stop", "Ctrl+C".cyan());

    server.run().await?;

    Ok(())
}
