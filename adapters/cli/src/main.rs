#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs reroute simulations and encodes manual
//! blockade layouts.

mod layout_transfer;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use reroute_core::{
    config::{EndpointSelection, SimConfig},
    GridEdge, GridSize, NodeCoord, RunOutcome,
};
use reroute_sim::RunReport;

use crate::layout_transfer::BlockadeLayoutSnapshot;

/// Replanning simulator for an agent crossing a grid with failing edges.
#[derive(Parser, Debug)]
#[command(name = "reroute", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Runs one simulation and prints its trace and outcome.
    Run(RunArgs),
    /// Encodes a manual blockade layout into a transfer string.
    EncodeLayout(EncodeLayoutArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Side length of the square node grid.
    #[arg(long, default_value = "10")]
    size: u32,

    /// Probability of discovering a blockade on an unblocked edge attempt.
    #[arg(long, default_value = "0.2")]
    p_block: f64,

    /// Seed for reproducible runs. When omitted, a random seed is drawn and
    /// echoed in the output.
    #[arg(long)]
    seed: Option<u64>,

    /// Start node as `x,y`.
    #[arg(long, value_parser = parse_node, conflicts_with = "random_endpoints", requires = "end")]
    start: Option<NodeCoord>,

    /// Target node as `x,y`.
    #[arg(long, value_parser = parse_node, conflicts_with = "random_endpoints", requires = "start")]
    end: Option<NodeCoord>,

    /// Draws the start and target nodes uniformly at random, never equal.
    #[arg(long)]
    random_endpoints: bool,

    /// Manual blockade layout string produced by `encode-layout`. Supplying a
    /// layout disables stochastic discovery for the run.
    #[arg(long)]
    layout: Option<String>,

    /// Prints the full run report as JSON instead of the human summary.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct EncodeLayoutArgs {
    /// Side length of the grid the layout applies to.
    #[arg(long)]
    size: u32,

    /// Blocked edge as `x1,y1:x2,y2`; repeat the flag for every edge.
    #[arg(long = "edge", value_parser = parse_edge_pair)]
    edges: Vec<(NodeCoord, NodeCoord)>,
}

/// Entry point for the reroute command-line interface.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        CliCommand::Run(args) => run_simulation(&args),
        CliCommand::EncodeLayout(args) => encode_layout(&args),
    }
}

fn run_simulation(args: &RunArgs) -> anyhow::Result<()> {
    let endpoints = if args.random_endpoints {
        EndpointSelection::Random
    } else {
        match (args.start, args.end) {
            (Some(start), Some(end)) => EndpointSelection::Fixed { start, end },
            _ => bail!("provide --start and --end, or pass --random-endpoints"),
        }
    };

    let (manual_mode, manual_blockades) = match &args.layout {
        Some(text) => {
            let snapshot = BlockadeLayoutSnapshot::decode(text)
                .context("could not decode the supplied layout")?;
            if snapshot.size != args.size {
                bail!(
                    "layout encodes a {0}x{0} grid but the run uses {1}x{1}",
                    snapshot.size,
                    args.size
                );
            }
            (true, snapshot.edges)
        }
        None => (false, Vec::new()),
    };

    let config = SimConfig {
        size: GridSize::new(args.size),
        p_block: args.p_block,
        endpoints,
        manual_blockades,
        manual_mode,
        seed: args.seed.unwrap_or_else(rand::random),
    };

    let report = reroute_sim::run(&config).context("invalid simulation configuration")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn encode_layout(args: &EncodeLayoutArgs) -> anyhow::Result<()> {
    let bounds = GridSize::new(args.size);
    let mut edges = Vec::with_capacity(args.edges.len());
    for &(first, second) in &args.edges {
        let Some(edge) = GridEdge::between(first, second) else {
            bail!(
                "nodes ({}, {}) and ({}, {}) are not 4-adjacent",
                first.x(),
                first.y(),
                second.x(),
                second.y()
            );
        };
        if !edge.a().is_within(bounds) || !edge.b().is_within(bounds) {
            bail!(
                "edge between ({}, {}) and ({}, {}) lies outside the {size}x{size} grid",
                edge.a().x(),
                edge.a().y(),
                edge.b().x(),
                edge.b().y(),
                size = args.size
            );
        }
        edges.push(edge);
    }
    edges.sort_unstable();
    edges.dedup();

    let snapshot = BlockadeLayoutSnapshot {
        size: args.size,
        edges,
    };
    println!("{}", snapshot.encode());
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!("seed: {}", report.config.seed);
    for entry in &report.trace {
        let marker = if entry.blocked_attempt {
            " blocked"
        } else {
            ""
        };
        println!(
            "t={:<4} ({}, {}){marker}",
            entry.tick,
            entry.position.x(),
            entry.position.y()
        );
    }

    match &report.outcome {
        RunOutcome::Arrived { path } => {
            println!("arrived after {} steps", path.len().saturating_sub(1));
        }
        RunOutcome::Stuck => println!("stuck: no route to the target remains"),
    }

    if !report.blocked_edges.is_empty() {
        println!("blocked edges: {}", report.blocked_edges.len());
    }
}

fn parse_node(value: &str) -> Result<NodeCoord, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got '{value}'"))?;
    let x = x
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("could not parse x coordinate '{x}'"))?;
    let y = y
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("could not parse y coordinate '{y}'"))?;
    Ok(NodeCoord::new(x, y))
}

fn parse_edge_pair(value: &str) -> Result<(NodeCoord, NodeCoord), String> {
    let (first, second) = value
        .split_once(':')
        .ok_or_else(|| format!("expected `x1,y1:x2,y2`, got '{value}'"))?;
    Ok((parse_node(first)?, parse_node(second)?))
}
