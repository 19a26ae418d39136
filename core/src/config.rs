//! Run configuration supplied by adapters before a simulation starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GridEdge, GridSize, NodeCoord};

/// Complete configuration of one simulation run.
///
/// The engine assumes a validated configuration; adapters call
/// [`SimConfig::validate`] before handing the value over. Edge adjacency needs
/// no separate check because [`GridEdge`] values cannot be constructed or
/// deserialized from non-adjacent endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Side length of the square node grid.
    pub size: GridSize,
    /// Probability of discovering a blockade on an otherwise-unblocked edge
    /// attempt; ignored while manual mode is active.
    pub p_block: f64,
    /// How the start and target nodes are chosen.
    pub endpoints: EndpointSelection,
    /// Permanently blocked edges supplied by the editor collaborator.
    pub manual_blockades: Vec<GridEdge>,
    /// Disables stochastic discovery, leaving the manual blockades as the
    /// sole source of obstruction.
    pub manual_mode: bool,
    /// Seed for the run's random source; a fixed seed fixes the entire trace.
    pub seed: u64,
}

impl SimConfig {
    /// Checks every configuration constraint, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size.get() < 2 {
            return Err(ConfigError::GridTooSmall(self.size.get()));
        }

        if !self.p_block.is_finite() || !(0.0..=1.0).contains(&self.p_block) {
            return Err(ConfigError::ProbabilityOutOfRange(self.p_block));
        }

        if let EndpointSelection::Fixed { start, end } = self.endpoints {
            if start == end {
                return Err(ConfigError::IdenticalEndpoints(start));
            }
            for node in [start, end] {
                if !node.is_within(self.size) {
                    return Err(ConfigError::EndpointOutOfBounds(node));
                }
            }
        }

        if !self.manual_mode && !self.manual_blockades.is_empty() {
            return Err(ConfigError::UnexpectedManualBlockades);
        }

        for edge in &self.manual_blockades {
            if !edge.a().is_within(self.size) || !edge.b().is_within(self.size) {
                return Err(ConfigError::BlockadeOutOfBounds(*edge));
            }
        }

        Ok(())
    }
}

/// How the start and target nodes of a run are chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointSelection {
    /// Explicit start and target nodes.
    Fixed {
        /// Node the agent departs from.
        start: NodeCoord,
        /// Node the agent attempts to reach.
        end: NodeCoord,
    },
    /// Start and target drawn uniformly at random, never equal.
    Random,
}

/// Reasons a run configuration may be rejected before the engine starts.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid cannot hold two distinct endpoints.
    #[error("grid size {0} cannot hold two distinct endpoints")]
    GridTooSmall(u32),
    /// The blockade probability fell outside the closed unit interval.
    #[error("blockade probability {0} is outside [0, 1]")]
    ProbabilityOutOfRange(f64),
    /// The start and target nodes coincide.
    #[error("start and target both sit at ({}, {})", .0.x(), .0.y())]
    IdenticalEndpoints(NodeCoord),
    /// An endpoint lies outside the configured grid.
    #[error("endpoint ({}, {}) lies outside the grid", .0.x(), .0.y())]
    EndpointOutOfBounds(NodeCoord),
    /// A manual blockade references a node outside the configured grid.
    #[error(
        "manual blockade between ({}, {}) and ({}, {}) lies outside the grid",
        .0.a().x(), .0.a().y(), .0.b().x(), .0.b().y()
    )]
    BlockadeOutOfBounds(GridEdge),
    /// Manual blockades were supplied while manual mode is disabled.
    #[error("manual blockades supplied while manual mode is disabled")]
    UnexpectedManualBlockades,
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EndpointSelection, SimConfig};
    use crate::{GridEdge, GridSize, NodeCoord};

    fn base_config() -> SimConfig {
        SimConfig {
            size: GridSize::new(5),
            p_block: 0.2,
            endpoints: EndpointSelection::Fixed {
                start: NodeCoord::new(0, 0),
                end: NodeCoord::new(4, 4),
            },
            manual_blockades: Vec::new(),
            manual_mode: false,
            seed: 7,
        }
    }

    #[test]
    fn accepts_a_well_formed_configuration() {
        assert_eq!(base_config().validate(), Ok(()));
    }

    #[test]
    fn rejects_grids_too_small_for_distinct_endpoints() {
        for side in [0, 1] {
            let mut config = base_config();
            config.size = GridSize::new(side);
            assert_eq!(config.validate(), Err(ConfigError::GridTooSmall(side)));
        }
    }

    #[test]
    fn rejects_probabilities_outside_the_unit_interval() {
        for p_block in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let mut config = base_config();
            config.p_block = p_block;
            assert!(matches!(
                config.validate(),
                Err(ConfigError::ProbabilityOutOfRange(_))
            ));
        }
    }

    #[test]
    fn rejects_identical_endpoints() {
        let mut config = base_config();
        config.endpoints = EndpointSelection::Fixed {
            start: NodeCoord::new(2, 2),
            end: NodeCoord::new(2, 2),
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::IdenticalEndpoints(NodeCoord::new(2, 2)))
        );
    }

    #[test]
    fn rejects_out_of_bounds_endpoints() {
        let mut config = base_config();
        config.endpoints = EndpointSelection::Fixed {
            start: NodeCoord::new(0, 0),
            end: NodeCoord::new(5, 0),
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EndpointOutOfBounds(NodeCoord::new(5, 0)))
        );
    }

    #[test]
    fn rejects_out_of_bounds_manual_blockades() {
        let edge = GridEdge::between(NodeCoord::new(4, 4), NodeCoord::new(4, 5))
            .expect("adjacent nodes form an edge");
        let mut config = base_config();
        config.manual_mode = true;
        config.manual_blockades = vec![edge];
        assert_eq!(
            config.validate(),
            Err(ConfigError::BlockadeOutOfBounds(edge))
        );
    }

    #[test]
    fn rejects_manual_blockades_without_manual_mode() {
        let edge = GridEdge::between(NodeCoord::new(0, 0), NodeCoord::new(1, 0))
            .expect("adjacent nodes form an edge");
        let mut config = base_config();
        config.manual_blockades = vec![edge];
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnexpectedManualBlockades)
        );
    }

    #[test]
    fn random_endpoints_skip_fixed_endpoint_checks() {
        let mut config = base_config();
        config.endpoints = EndpointSelection::Random;
        assert_eq!(config.validate(), Ok(()));
    }
}
