//! Solve results shared by both topologies.

use serde::{Deserialize, Serialize};
use sf_core::{NodeId, PipeSize};
use sf_network::Row;

use crate::hardy_cross::HardyCrossOutcome;
use crate::profile::{BlockedFitting, BranchProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopologyKind {
    Tree,
    Grid,
}

/// One row of the grid node table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub id: NodeId,
    pub label: String,
    pub row: Row,
    pub col: usize,
    pub is_inlet: bool,
    pub demand_lpm: f64,
    pub inflow_lpm: f64,
    pub outflow_lpm: f64,
    /// `inflow + supply - outflow - demand`
    pub balance_lpm: f64,
    pub pressure_mpa: f64,
}

/// Hardy-Cross state carried by a grid solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDiagnostics {
    pub iterations: usize,
    pub final_imbalance_m: f64,
    pub final_delta_q_lpm: f64,
    pub converged: bool,
    pub diverged: bool,
    pub outcome: HardyCrossOutcome,
    pub imbalance_history: Vec<f64>,
    pub delta_q_history: Vec<f64>,
    pub nodes: Vec<NodeState>,
    /// Signed flow per pipe id (LPM)
    pub pipe_flows_lpm: Vec<f64>,
    /// Largest flow magnitude in any cross-main segment (LPM)
    pub max_cross_main_flow_lpm: f64,
}

/// Pressures through the whole network for one set of inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    pub topology: TopologyKind,
    pub branch_profiles: Vec<BranchProfile>,
    pub branch_inlet_pressures_mpa: Vec<f64>,
    pub terminal_pressures_mpa: Vec<f64>,
    pub worst_branch_index: usize,
    pub worst_terminal_mpa: f64,
    pub total_heads: usize,
    pub cross_main_size: PipeSize,
    /// Cross-main loss ahead of each branch tap (0 for the first)
    pub cross_main_losses_mpa: Vec<f64>,
    pub cross_main_cumulative_mpa: f64,
    pub blocked_fittings: Vec<BlockedFitting>,
    pub grid: Option<GridDiagnostics>,
}

impl SolveResult {
    pub fn worst_profile(&self) -> Option<&BranchProfile> {
        self.branch_profiles.get(self.worst_branch_index)
    }

    /// Tree solves are always balanced; grid solves report Hardy-Cross convergence.
    pub fn converged(&self) -> bool {
        self.grid.as_ref().is_none_or(|g| g.converged)
    }
}

/// Index and value of the lowest terminal pressure (first one on ties).
pub(crate) fn worst_terminal(terminals: &[f64]) -> (usize, f64) {
    let mut worst = (0, f64::INFINITY);
    for (i, &p) in terminals.iter().enumerate() {
        if p < worst.1 {
            worst = (i, p);
        }
    }
    if terminals.is_empty() {
        (0, 0.0)
    } else {
        worst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_is_scanned_not_assumed() {
        assert_eq!(worst_terminal(&[0.5, 0.2, 0.3]), (1, 0.2));
        assert_eq!(worst_terminal(&[0.2, 0.2]), (0, 0.2));
        assert_eq!(worst_terminal(&[]), (0, 0.0));
    }
}
