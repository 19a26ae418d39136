#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative per-run simulation state for reroute.
//!
//! One [`World`] instance owns everything a single run mutates: the agent's
//! position, the discrete clock, the blockade record, the append-only trace,
//! and the seeded random source. State changes flow exclusively through
//! [`apply`]; read access flows exclusively through [`query`].

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use reroute_core::{
    config::{EndpointSelection, SimConfig},
    Command, Event, GridEdge, GridSize, NodeCoord, TraceEntry,
};

mod blockades;

use blockades::BlockadeState;

/// Represents the authoritative state of one simulation run.
#[derive(Debug)]
pub struct World {
    size: GridSize,
    agent: NodeCoord,
    target: NodeCoord,
    tick: u32,
    p_block: f64,
    manual_mode: bool,
    blockades: BlockadeState,
    trace: Vec<TraceEntry>,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates the state for a fresh run from a validated configuration.
    ///
    /// Random endpoints are resolved here, from the same seeded source the
    /// stochastic discovery rule draws from, so a fixed seed fixes both the
    /// endpoints and the trace. The trace starts with the seed entry
    /// `(0, start, false)`.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let (agent, target) = match config.endpoints {
            EndpointSelection::Fixed { start, end } => (start, end),
            EndpointSelection::Random => draw_endpoints(config.size, &mut rng),
        };

        Self {
            size: config.size,
            agent,
            target,
            tick: 0,
            p_block: config.p_block,
            manual_mode: config.manual_mode,
            blockades: BlockadeState::seeded(&config.manual_blockades),
            trace: vec![TraceEntry {
                tick: 0,
                position: agent,
                blocked_attempt: false,
            }],
            rng,
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Launch => {
            if world.agent == world.target {
                out_events.push(Event::AgentArrived {
                    tick: world.tick,
                    at: world.agent,
                });
            } else {
                out_events.push(Event::RouteNeeded { at: world.agent });
            }
        }
        Command::Step { to } => {
            let from = world.agent;
            let Some(edge) = GridEdge::between(from, to) else {
                out_events.push(Event::RouteNeeded { at: from });
                return;
            };
            if !to.is_within(world.size) {
                out_events.push(Event::RouteNeeded { at: from });
                return;
            }

            if !world.manual_mode && !world.blockades.is_edge_blocked(edge) {
                let draw: f64 = world.rng.gen();
                if draw < world.p_block {
                    let _ = world.blockades.record_failure(edge);
                    out_events.push(Event::BlockadeDiscovered { edge });
                }
            }

            if world.blockades.is_edge_blocked(edge) {
                world.trace.push(TraceEntry {
                    tick: world.tick,
                    position: from,
                    blocked_attempt: true,
                });
                out_events.push(Event::StepRejected {
                    tick: world.tick,
                    at: from,
                    edge,
                });
                out_events.push(Event::RouteNeeded { at: from });
            } else {
                world.tick = world.tick.saturating_add(1);
                world.agent = to;
                world.trace.push(TraceEntry {
                    tick: world.tick,
                    position: to,
                    blocked_attempt: false,
                });
                out_events.push(Event::AgentAdvanced {
                    tick: world.tick,
                    from,
                    to,
                });
                if to == world.target {
                    out_events.push(Event::AgentArrived {
                        tick: world.tick,
                        at: to,
                    });
                } else {
                    out_events.push(Event::RouteNeeded { at: to });
                }
            }
        }
    }
}

fn draw_endpoints(size: GridSize, rng: &mut ChaCha8Rng) -> (NodeCoord, NodeCoord) {
    let start = draw_node(size, rng);
    let mut end = draw_node(size, rng);
    while end == start {
        end = draw_node(size, rng);
    }
    (start, end)
}

fn draw_node(size: GridSize, rng: &mut ChaCha8Rng) -> NodeCoord {
    let x = rng.gen_range(0..size.get());
    let y = rng.gen_range(0..size.get());
    NodeCoord::new(x, y)
}

/// Query functions that provide read-only access to the run state.
pub mod query {
    use super::{BlockadeState, World};
    use reroute_core::{GridEdge, GridSize, NodeCoord, TraceEntry};

    /// Side length of the grid the run executes on.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.size
    }

    /// Node the agent currently occupies.
    #[must_use]
    pub fn agent(world: &World) -> NodeCoord {
        world.agent
    }

    /// Node the agent attempts to reach.
    #[must_use]
    pub fn target(world: &World) -> NodeCoord {
        world.target
    }

    /// Current tick value; increments only on successful advances.
    #[must_use]
    pub fn tick(world: &World) -> u32 {
        world.tick
    }

    /// Append-only trace recorded so far, in append order.
    #[must_use]
    pub fn trace(world: &World) -> &[TraceEntry] {
        &world.trace
    }

    /// Captures a read-only view of the current blockade record.
    #[must_use]
    pub fn blockades(world: &World) -> BlockadeView<'_> {
        BlockadeView {
            state: &world.blockades,
        }
    }

    /// Read-only view into the run's blockade record.
    #[derive(Clone, Copy, Debug)]
    pub struct BlockadeView<'a> {
        state: &'a BlockadeState,
    }

    impl BlockadeView<'_> {
        /// Reports whether the edge is known to be impassable.
        #[must_use]
        pub fn is_edge_blocked(&self, edge: GridEdge) -> bool {
            self.state.is_edge_blocked(edge)
        }

        /// Reports whether the node is known to be unusable for routing.
        #[must_use]
        pub fn is_node_blocked(&self, node: NodeCoord) -> bool {
            self.state.is_node_blocked(node)
        }

        /// Number of edges currently known blocked.
        #[must_use]
        pub fn blocked_edge_count(&self) -> usize {
            self.state.blocked_edge_count()
        }

        /// Blocked edges in deterministic order.
        #[must_use]
        pub fn blocked_edges(&self) -> Vec<GridEdge> {
            self.state.sorted_edges()
        }

        /// Blocked nodes in deterministic order.
        #[must_use]
        pub fn blocked_nodes(&self) -> Vec<NodeCoord> {
            self.state.sorted_nodes()
        }
    }
}
