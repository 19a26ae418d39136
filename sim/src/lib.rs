#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Run-to-completion driver for the reroute replanning simulation.
//!
//! The driver owns the outer plan/step cycle: it pumps planner commands into
//! the world and world events back into the planner until the agent arrives
//! or the planner can no longer propose a step. One call to [`run`] executes
//! a whole run synchronously; the returned [`RunReport`] is the only surface
//! downstream visualization and report collaborators consume.

use serde::{Deserialize, Serialize};

use reroute_core::{
    config::{ConfigError, SimConfig},
    Command, Event, GridEdge, NodeCoord, RunOutcome, TraceEntry,
};
use reroute_system_planner::Planner;
use reroute_world::{self as world, query, World};

/// Complete record of a finished simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Configuration the run executed with, including the effective seed.
    pub config: SimConfig,
    /// Terminal outcome of the run.
    pub outcome: RunOutcome,
    /// Full event trace in append order, starting with the seed entry.
    pub trace: Vec<TraceEntry>,
    /// Every edge known blocked when the run ended, in deterministic order.
    pub blocked_edges: Vec<GridEdge>,
    /// Every node known blocked when the run ended, in deterministic order.
    pub blocked_nodes: Vec<NodeCoord>,
}

/// Runs one simulation to completion.
///
/// The configuration is validated first; the engine itself then assumes it.
/// Getting stuck is a reported outcome, not an error: the run stops cleanly
/// with whatever trace had accumulated. The cycle terminates because the
/// blockade record only grows and the grid holds finitely many edges.
pub fn run(config: &SimConfig) -> Result<RunReport, ConfigError> {
    config.validate()?;

    let mut world = World::new(config);
    let mut planner = Planner::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::Launch, &mut events);

    let outcome = loop {
        if events
            .iter()
            .any(|event| matches!(event, Event::AgentArrived { .. }))
        {
            break RunOutcome::Arrived {
                path: realized_path(query::trace(&world)),
            };
        }

        let mut commands = Vec::new();
        planner.handle(
            &events,
            query::grid_size(&world),
            query::target(&world),
            &query::blockades(&world),
            &mut commands,
        );
        if commands.is_empty() {
            break RunOutcome::Stuck;
        }

        events.clear();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
    };

    let blockades = query::blockades(&world);
    Ok(RunReport {
        config: config.clone(),
        outcome,
        trace: query::trace(&world).to_vec(),
        blocked_edges: blockades.blocked_edges(),
        blocked_nodes: blockades.blocked_nodes(),
    })
}

fn realized_path(trace: &[TraceEntry]) -> Vec<NodeCoord> {
    trace
        .iter()
        .filter(|entry| !entry.blocked_attempt)
        .map(|entry| entry.position)
        .collect()
}
