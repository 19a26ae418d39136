#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the reroute simulation engine.
//!
//! This crate defines the message surface that connects the driver, the
//! authoritative run state, and the pure planning system. The driver submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views, and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};

pub mod config;

/// Side length of the square node grid measured in whole nodes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridSize(u32);

impl GridSize {
    /// Creates a new grid size wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying side length.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid node expressed as `(x, y)` coordinates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeCoord {
    x: u32,
    y: u32,
}

impl NodeCoord {
    /// Creates a new grid node coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based horizontal index of the node.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based vertical index of the node.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Reports whether the node lies within a square grid of the given size.
    #[must_use]
    pub const fn is_within(&self, size: GridSize) -> bool {
        self.x < size.get() && self.y < size.get()
    }

    /// Computes the Manhattan distance between two node coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: NodeCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Iterates the 4-connected neighbors of the node that lie within bounds.
    ///
    /// The visit order is fixed at −x, +x, −y, +y so that consumers expanding
    /// neighbors in iteration order behave identically on every run.
    #[must_use]
    pub fn neighbors(self, size: GridSize) -> NeighborIter {
        let mut neighbors = NeighborIter::default();

        if let Some(x) = self.x.checked_sub(1) {
            neighbors.push(NodeCoord::new(x, self.y));
        }
        if self.x + 1 < size.get() {
            neighbors.push(NodeCoord::new(self.x + 1, self.y));
        }
        if let Some(y) = self.y.checked_sub(1) {
            neighbors.push(NodeCoord::new(self.x, y));
        }
        if self.y + 1 < size.get() {
            neighbors.push(NodeCoord::new(self.x, self.y + 1));
        }

        neighbors
    }
}

/// Fixed-order iterator over the in-bounds neighbors of a node.
#[derive(Clone, Debug, Default)]
pub struct NeighborIter {
    buffer: [Option<NodeCoord>; 4],
    len: usize,
    cursor: usize,
}

impl NeighborIter {
    fn push(&mut self, node: NodeCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(node);
            self.len += 1;
        }
    }
}

impl Iterator for NeighborIter {
    type Item = NodeCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

/// Unordered adjacency between two 4-connected nodes.
///
/// Edges are canonicalized on construction so that the lexicographically
/// smaller endpoint is always stored first; equality and hashing are therefore
/// independent of the order the endpoints were supplied in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridEdge {
    a: NodeCoord,
    b: NodeCoord,
}

impl GridEdge {
    /// Builds the canonical edge between two nodes, or `None` when the nodes
    /// are not at Manhattan distance exactly one.
    #[must_use]
    pub fn between(first: NodeCoord, second: NodeCoord) -> Option<Self> {
        if first.manhattan_distance(second) != 1 {
            return None;
        }

        if first <= second {
            Some(Self {
                a: first,
                b: second,
            })
        } else {
            Some(Self {
                a: second,
                b: first,
            })
        }
    }

    /// Lexicographically smaller endpoint of the edge.
    #[must_use]
    pub const fn a(&self) -> NodeCoord {
        self.a
    }

    /// Lexicographically larger endpoint of the edge.
    #[must_use]
    pub const fn b(&self) -> NodeCoord {
        self.b
    }
}

#[derive(Deserialize)]
#[serde(rename = "GridEdge")]
struct GridEdgeWire {
    a: NodeCoord,
    b: NodeCoord,
}

impl<'de> Deserialize<'de> for GridEdge {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = GridEdgeWire::deserialize(deserializer)?;
        GridEdge::between(wire.a, wire.b)
            .ok_or_else(|| serde::de::Error::custom("grid edge endpoints must be 4-adjacent"))
    }
}

/// Commands that express all permissible run-state mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Starts the run by requesting the first route from the start node.
    Launch,
    /// Requests that the agent advance one step to the specified node.
    Step {
        /// Destination node of the attempted step.
        to: NodeCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the agent requires a fresh route from its position.
    RouteNeeded {
        /// Node the agent currently occupies.
        at: NodeCoord,
    },
    /// Announces that a stochastic edge failure was discovered.
    BlockadeDiscovered {
        /// Edge that failed; both endpoints are now unusable.
        edge: GridEdge,
    },
    /// Reports that a step attempt was rejected by a blocked edge.
    StepRejected {
        /// Tick value at the time of the rejected attempt.
        tick: u32,
        /// Node the agent occupied when the attempt failed.
        at: NodeCoord,
        /// Edge the agent attempted to traverse.
        edge: GridEdge,
    },
    /// Confirms that the agent successfully moved between two nodes.
    AgentAdvanced {
        /// Tick value after the advance.
        tick: u32,
        /// Node the agent occupied before moving.
        from: NodeCoord,
        /// Node the agent occupies after completing the move.
        to: NodeCoord,
    },
    /// Announces that the agent reached the target node.
    AgentArrived {
        /// Tick value at arrival.
        tick: u32,
        /// Target node the agent arrived at.
        at: NodeCoord,
    },
}

/// Single entry of the append-only run trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Discrete time value; increments only on successful advances.
    pub tick: u32,
    /// Node the agent occupied when the entry was recorded.
    pub position: NodeCoord,
    /// Indicates a blocked, non-advancing attempt.
    pub blocked_attempt: bool,
}

/// Terminal outcome of a simulation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The agent reached the target node.
    Arrived {
        /// Realized node sequence from start to target, in visit order.
        path: Vec<NodeCoord>,
    },
    /// The target became unreachable given the accumulated blockades.
    Stuck,
}
