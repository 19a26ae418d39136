#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic breadth-first route planner that proposes agent steps.

use std::collections::VecDeque;

use reroute_core::{Command, Event, GridEdge, GridSize, NodeCoord};
use reroute_world::query::BlockadeView;

/// Pure system that reacts to route requests and emits step commands.
///
/// The planner holds no run state of its own; the buffers below are scratch
/// space reused across searches so replanning does not allocate per request.
#[derive(Debug, Default)]
pub struct Planner {
    frontier: VecDeque<NodeCoord>,
    visited: Vec<bool>,
    parents: Vec<Option<NodeCoord>>,
}

impl Planner {
    /// Creates a new planner with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and the blockade view to emit step commands.
    ///
    /// Every `RouteNeeded` event triggers a fresh shortest-path search from
    /// the requested position, so each proposed step reflects all blockades
    /// known at that moment. When no usable route exists the planner emits
    /// nothing; the driver treats an empty command batch as the run being
    /// stuck.
    pub fn handle(
        &mut self,
        events: &[Event],
        size: GridSize,
        target: NodeCoord,
        blockades: &BlockadeView<'_>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::RouteNeeded { at } = event else {
                continue;
            };
            if *at == target {
                continue;
            }

            let Some(route) = self.find_route(*at, target, size, blockades) else {
                continue;
            };
            if route.len() < 2 {
                continue;
            }

            out.push(Command::Step { to: route[1] });
        }
    }

    /// Breadth-first shortest path from `start` to `end`.
    ///
    /// Nodes expand in the fixed −x, +x, −y, +y order so the choice among
    /// equal-length shortest paths is reproducible. A node is expandable only
    /// if it is not blocked, and an edge is traversable only if it is not
    /// blocked. Returns the start→end node sequence, or `None` when the
    /// frontier exhausts without reaching `end`. `start == end` yields the
    /// single-node route; callers decide whether that means anything.
    pub fn find_route(
        &mut self,
        start: NodeCoord,
        end: NodeCoord,
        size: GridSize,
        blockades: &BlockadeView<'_>,
    ) -> Option<Vec<NodeCoord>> {
        let side = usize::try_from(size.get()).ok()?;
        let node_count = side.checked_mul(side)?;
        self.prepare_workspace(node_count);

        let start_slot = index(side, start)?;
        self.visited[start_slot] = true;
        self.frontier.push_back(start);

        while let Some(current) = self.frontier.pop_front() {
            if current == end {
                break;
            }

            for neighbor in current.neighbors(size) {
                let Some(slot) = index(side, neighbor) else {
                    continue;
                };
                if self.visited[slot] {
                    continue;
                }
                if blockades.is_node_blocked(neighbor) {
                    continue;
                }
                let Some(edge) = GridEdge::between(current, neighbor) else {
                    continue;
                };
                if blockades.is_edge_blocked(edge) {
                    continue;
                }

                self.visited[slot] = true;
                self.parents[slot] = Some(current);
                self.frontier.push_back(neighbor);
            }
        }

        let mut route = Vec::new();
        let mut node = end;
        while node != start {
            let slot = index(side, node)?;
            let Some(parent) = self.parents[slot] else {
                return None;
            };
            route.push(node);
            node = parent;
        }
        route.push(start);
        route.reverse();
        Some(route)
    }

    fn prepare_workspace(&mut self, node_count: usize) {
        self.frontier.clear();
        if self.visited.len() != node_count {
            self.visited = vec![false; node_count];
            self.parents = vec![None; node_count];
        } else {
            self.visited.fill(false);
            self.parents.fill(None);
        }
    }
}

fn index(side: usize, node: NodeCoord) -> Option<usize> {
    let x = usize::try_from(node.x()).ok()?;
    let y = usize::try_from(node.y()).ok()?;
    if x >= side || y >= side {
        return None;
    }
    y.checked_mul(side)?.checked_add(x)
}

#[cfg(test)]
mod tests {
    use super::Planner;
    use reroute_core::{
        config::{EndpointSelection, SimConfig},
        Command, Event, GridEdge, GridSize, NodeCoord,
    };
    use reroute_world::{query, World};

    fn world_with_blockades(side: u32, manual: Vec<GridEdge>) -> World {
        World::new(&SimConfig {
            size: GridSize::new(side),
            p_block: 0.0,
            endpoints: EndpointSelection::Fixed {
                start: NodeCoord::new(0, 0),
                end: NodeCoord::new(side - 1, side - 1),
            },
            manual_mode: !manual.is_empty(),
            manual_blockades: manual,
            seed: 0,
        })
    }

    fn edge(ax: u32, ay: u32, bx: u32, by: u32) -> GridEdge {
        GridEdge::between(NodeCoord::new(ax, ay), NodeCoord::new(bx, by))
            .expect("adjacent nodes form an edge")
    }

    #[test]
    fn open_grid_route_has_manhattan_length() {
        let world = world_with_blockades(5, Vec::new());
        let mut planner = Planner::new();

        let route = planner
            .find_route(
                NodeCoord::new(1, 0),
                NodeCoord::new(4, 3),
                GridSize::new(5),
                &query::blockades(&world),
            )
            .expect("open grid is fully connected");

        assert_eq!(route.len(), 7);
        assert_eq!(route[0], NodeCoord::new(1, 0));
        assert_eq!(route[6], NodeCoord::new(4, 3));
    }

    #[test]
    fn tie_breaks_follow_the_fixed_expansion_order() {
        let world = world_with_blockades(3, Vec::new());
        let mut planner = Planner::new();

        let route = planner
            .find_route(
                NodeCoord::new(0, 0),
                NodeCoord::new(2, 2),
                GridSize::new(3),
                &query::blockades(&world),
            )
            .expect("open grid is fully connected");

        assert_eq!(
            route,
            vec![
                NodeCoord::new(0, 0),
                NodeCoord::new(1, 0),
                NodeCoord::new(2, 0),
                NodeCoord::new(2, 1),
                NodeCoord::new(2, 2),
            ]
        );
    }

    #[test]
    fn routes_detour_around_blocked_nodes() {
        let world = world_with_blockades(3, vec![edge(0, 0, 1, 0)]);
        let mut planner = Planner::new();

        let route = planner
            .find_route(
                NodeCoord::new(0, 0),
                NodeCoord::new(2, 2),
                GridSize::new(3),
                &query::blockades(&world),
            )
            .expect("a detour around the blocked corner exists");

        assert_eq!(route.len(), 5);
        assert!(!route.contains(&NodeCoord::new(1, 0)));
        assert_eq!(route[1], NodeCoord::new(0, 1));
    }

    #[test]
    fn reports_unreachable_when_the_start_is_cut_off() {
        let world = world_with_blockades(2, vec![edge(0, 0, 1, 0), edge(0, 0, 0, 1)]);
        let mut planner = Planner::new();

        let route = planner.find_route(
            NodeCoord::new(0, 0),
            NodeCoord::new(1, 1),
            GridSize::new(2),
            &query::blockades(&world),
        );

        assert!(route.is_none());
    }

    #[test]
    fn coincident_endpoints_yield_a_single_node_route() {
        let world = world_with_blockades(3, Vec::new());
        let mut planner = Planner::new();

        let route = planner
            .find_route(
                NodeCoord::new(1, 1),
                NodeCoord::new(1, 1),
                GridSize::new(3),
                &query::blockades(&world),
            )
            .expect("a node can always reach itself");

        assert_eq!(route, vec![NodeCoord::new(1, 1)]);
    }

    #[test]
    fn handle_emits_one_step_per_route_request() {
        let world = world_with_blockades(3, Vec::new());
        let mut planner = Planner::new();
        let mut commands = Vec::new();

        planner.handle(
            &[Event::RouteNeeded {
                at: NodeCoord::new(0, 0),
            }],
            GridSize::new(3),
            NodeCoord::new(2, 2),
            &query::blockades(&world),
            &mut commands,
        );

        assert_eq!(
            commands,
            vec![Command::Step {
                to: NodeCoord::new(1, 0)
            }]
        );
    }

    #[test]
    fn handle_stays_silent_when_no_route_remains() {
        let world = world_with_blockades(2, vec![edge(0, 0, 1, 0), edge(0, 0, 0, 1)]);
        let mut planner = Planner::new();
        let mut commands = Vec::new();

        planner.handle(
            &[Event::RouteNeeded {
                at: NodeCoord::new(0, 0),
            }],
            GridSize::new(2),
            NodeCoord::new(1, 1),
            &query::blockades(&world),
            &mut commands,
        );

        assert!(commands.is_empty());
    }

    #[test]
    fn handle_ignores_requests_already_at_the_target() {
        let world = world_with_blockades(3, Vec::new());
        let mut planner = Planner::new();
        let mut commands = Vec::new();

        planner.handle(
            &[Event::RouteNeeded {
                at: NodeCoord::new(2, 2),
            }],
            GridSize::new(3),
            NodeCoord::new(2, 2),
            &query::blockades(&world),
            &mut commands,
        );

        assert!(commands.is_empty());
    }
}
