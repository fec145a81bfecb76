//! Relumin CLI
//!
//! Parses and fetches Redis Cluster topology reports, INFO output and slot
//! range notation.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use relumin_core::cluster::{ClusterTopology, decode_slots, encode_slots};
use relumin_core::monitoring::{parse_cluster_info_result, parse_info_result};
use relumin_core::{NodeInspector, RedisExecutor, ReluminConfig, logging};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

mod render;

#[derive(Parser)]
#[command(name = "relumin")]
#[command(about = "Inspect Redis Cluster topology and slot assignments", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse raw CLUSTER NODES output
    Nodes {
        /// File holding the report (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Endpoint the report was fetched from, used to resolve loopback addresses
        #[arg(short, long, default_value = "")]
        endpoint: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Fetch CLUSTER NODES from one or more nodes
    Fetch {
        /// Node address (host:port), repeatable
        #[arg(short, long = "endpoint")]
        endpoints: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Parse raw INFO or CLUSTER INFO output
    Info {
        /// File holding the report (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Treat input as CLUSTER INFO (no capture timestamp)
        #[arg(long)]
        cluster: bool,

        /// Print JSON instead of key:value lines
        #[arg(long)]
        json: bool,
    },

    /// Convert between slot lists and range notation
    Slots {
        #[command(subcommand)]
        action: SlotsAction,
    },
}

#[derive(Subcommand)]
enum SlotsAction {
    /// Encode slot numbers, e.g. `1 2 3 7` -> `1-3,7`
    Encode {
        #[arg(required = true)]
        slots: Vec<u16>,
    },

    /// Decode range tokens, e.g. `1-3 7` or `1-3,7`
    Decode {
        #[arg(required = true)]
        tokens: Vec<String>,
    },
}

/// Result of polling one endpoint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchOutcome {
    endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<ClusterTopology>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Poll every endpoint concurrently, one CLUSTER NODES round trip each
async fn fetch_all(config: &ReluminConfig, endpoints: Vec<String>) -> Vec<FetchOutcome> {
    let inspector = Arc::new(NodeInspector::new(RedisExecutor::from_config(&config.redis)));

    let handles: Vec<_> = endpoints
        .into_iter()
        .map(|endpoint| {
            let inspector = Arc::clone(&inspector);
            let target = endpoint.clone();
            let handle = tokio::task::spawn_blocking(move || inspector.cluster_nodes(&target));
            (endpoint, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (endpoint, handle) in handles {
        let result = match handle.await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(e) => Err(format!("poll task failed: {}", e)),
        };
        match result {
            Ok(topology) => {
                info!("{} reported {} nodes", endpoint, topology.len());
                outcomes.push(FetchOutcome {
                    endpoint,
                    nodes: Some(topology),
                    error: None,
                });
            }
            Err(e) => {
                error!("Failed to fetch topology from {}: {}", endpoint, e);
                outcomes.push(FetchOutcome {
                    endpoint,
                    nodes: None,
                    error: Some(e),
                });
            }
        }
    }
    outcomes
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ReluminConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReluminConfig::default(),
    };

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Nodes {
            input,
            endpoint,
            json,
        } => {
            let raw = read_input(input.as_deref())?;
            let topology = ClusterTopology::parse(&raw, &endpoint)
                .context("Failed to parse CLUSTER NODES output")?;
            if json {
                print_json(&topology)?;
            } else {
                println!("{}", render::topology_table(&topology));
            }
        }

        Commands::Fetch {
            mut endpoints,
            json,
        } => {
            if endpoints.is_empty() {
                match &config.redis.default_endpoint {
                    Some(endpoint) => endpoints.push(endpoint.clone()),
                    None => bail!("No endpoint given and no redis.default_endpoint configured"),
                }
            }

            let outcomes = fetch_all(&config, endpoints).await;
            let failed = outcomes.iter().filter(|o| o.error.is_some()).count();

            if json {
                print_json(&outcomes)?;
            } else {
                for outcome in &outcomes {
                    println!("== {}", outcome.endpoint);
                    match (&outcome.nodes, &outcome.error) {
                        (Some(topology), _) => println!("{}\n", render::topology_table(topology)),
                        (None, Some(e)) => println!("error: {}\n", e),
                        (None, None) => {}
                    }
                }
            }

            if failed > 0 {
                warn!("{} of {} endpoints failed", failed, outcomes.len());
                bail!("{} endpoint(s) could not be inspected", failed);
            }
        }

        Commands::Info {
            input,
            cluster,
            json,
        } => {
            let raw = read_input(input.as_deref())?;
            let report = if cluster {
                parse_cluster_info_result(&raw)
            } else {
                parse_info_result(&raw)
            };
            if json {
                print_json(&report)?;
            } else {
                println!("{}", render::info_lines(&report));
            }
        }

        Commands::Slots { action } => match action {
            SlotsAction::Encode { slots } => {
                let slots: BTreeSet<u16> = slots.into_iter().collect();
                if let Some(slot) = slots.iter().find(|&&s| s >= relumin_core::cluster::TOTAL_SLOTS) {
                    bail!("Slot {} is out of range (0-16383)", slot);
                }
                println!("{}", encode_slots(&slots));
            }
            SlotsAction::Decode { tokens } => {
                let tokens: Vec<&str> = tokens
                    .iter()
                    .flat_map(|t| t.split(','))
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect();
                let slots = decode_slots(&tokens)?;
                let listed: Vec<String> = slots.iter().map(u16::to_string).collect();
                println!("{}", listed.join(" "));
            }
        },
    }

    Ok(())
}
