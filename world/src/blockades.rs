//! Blockade bookkeeping for a single simulation run.

use std::collections::HashSet;

use reroute_core::{GridEdge, NodeCoord};

/// Mutable record of every edge and node currently known to be impassable.
///
/// A failed edge removes both of its endpoints from routing consideration,
/// not just the single connection between them. The sets only ever grow over
/// the course of one run; manual seeds and stochastic discoveries are never
/// removed.
#[derive(Clone, Debug, Default)]
pub(crate) struct BlockadeState {
    edges: HashSet<GridEdge>,
    nodes: HashSet<NodeCoord>,
}

impl BlockadeState {
    /// Seeds the state from the manually declared permanent blockades.
    pub(crate) fn seeded(manual: &[GridEdge]) -> Self {
        let mut state = Self::default();
        for &edge in manual {
            let _ = state.record_failure(edge);
        }
        state
    }

    /// Reports whether the edge is known to be impassable.
    #[must_use]
    pub(crate) fn is_edge_blocked(&self, edge: GridEdge) -> bool {
        self.edges.contains(&edge)
    }

    /// Reports whether the node is known to be unusable for routing.
    #[must_use]
    pub(crate) fn is_node_blocked(&self, node: NodeCoord) -> bool {
        self.nodes.contains(&node)
    }

    /// Records a failed edge and marks both endpoints unusable.
    ///
    /// Idempotent; returns whether the failure was newly recorded.
    pub(crate) fn record_failure(&mut self, edge: GridEdge) -> bool {
        let inserted = self.edges.insert(edge);
        let _ = self.nodes.insert(edge.a());
        let _ = self.nodes.insert(edge.b());
        inserted
    }

    /// Number of edges currently known blocked.
    #[must_use]
    pub(crate) fn blocked_edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Blocked edges in deterministic order.
    #[must_use]
    pub(crate) fn sorted_edges(&self) -> Vec<GridEdge> {
        let mut edges: Vec<GridEdge> = self.edges.iter().copied().collect();
        edges.sort_unstable();
        edges
    }

    /// Blocked nodes in deterministic order.
    #[must_use]
    pub(crate) fn sorted_nodes(&self) -> Vec<NodeCoord> {
        let mut nodes: Vec<NodeCoord> = self.nodes.iter().copied().collect();
        nodes.sort_unstable();
        nodes
    }
}
