//! One entry point for both network shapes.

use serde::{Deserialize, Serialize};
use sf_network::NetworkParams;

use crate::error::SolverResult;
use crate::grid::solve_grid;
use crate::hardy_cross::HardyCrossConfig;
use crate::result::SolveResult;
use crate::tree::solve_tree;

/// Network shape, chosen once per study.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Topology {
    #[default]
    Tree,
    Grid(HardyCrossConfig),
}

impl Topology {
    pub fn grid() -> Self {
        Topology::Grid(HardyCrossConfig::default())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Topology::Tree => "tree",
            Topology::Grid(_) => "grid",
        }
    }

    pub fn solve(&self, params: &NetworkParams) -> SolverResult<SolveResult> {
        solve(self, params)
    }
}

/// Solve `params` on `topology`.
pub fn solve(topology: &Topology, params: &NetworkParams) -> SolverResult<SolveResult> {
    match topology {
        Topology::Tree => solve_tree(params),
        Topology::Grid(config) => solve_grid(params, config),
    }
}
