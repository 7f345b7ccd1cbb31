//! Conventional versus shape-controlled welding, head to head.

use serde::{Deserialize, Serialize};
use sf_core::{PipeSize, defaults};
use sf_network::NetworkParams;
use tracing::debug;

use crate::error::SolverResult;
use crate::profile::BranchProfile;
use crate::result::SolveResult;
use crate::topology::{Topology, solve};

/// Bead settings of the two cases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseSpec {
    /// Case A fitting and weld bead height (mm)
    pub bead_height_existing: f64,
    /// Case B fitting bead height (mm)
    pub bead_height_new: f64,
    /// Case A straight-run weld beads per branch, evenly spaced
    pub beads_per_branch: u32,
}

impl Default for CaseSpec {
    fn default() -> Self {
        Self {
            bead_height_existing: defaults::BEAD_HEIGHT_MM,
            bead_height_new: defaults::NEW_TECH_BEAD_HEIGHT_MM,
            beads_per_branch: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub system_a: SolveResult,
    pub system_b: SolveResult,
    pub worst_profile_a: BranchProfile,
    pub worst_profile_b: BranchProfile,
    pub terminal_a_mpa: f64,
    pub terminal_b_mpa: f64,
    /// `(B - A) / |A| * 100`
    pub improvement_pct: f64,
    pub pass_a: bool,
    pub pass_b: bool,
    pub worst_branch_a: usize,
    pub worst_branch_b: usize,
    pub cross_main_size: PipeSize,
    pub total_heads: usize,
}

/// Case parameters: A with beads everywhere, B clean.
pub fn case_params(params: &NetworkParams, case: &CaseSpec) -> (NetworkParams, NetworkParams) {
    let mut a = params
        .clone()
        .with_uniform_bead_height(case.bead_height_existing)
        .with_weld_beads(case.beads_per_branch, case.bead_height_existing);
    a.weld_bead_layout = None;

    let mut b = params
        .clone()
        .with_uniform_bead_height(case.bead_height_new)
        .with_weld_beads(0, case.bead_height_new);
    b.weld_bead_layout = None;

    (a, b)
}

pub fn improvement_pct(terminal_a: f64, terminal_b: f64) -> f64 {
    if terminal_a == 0.0 {
        0.0
    } else {
        (terminal_b - terminal_a) / terminal_a.abs() * 100.0
    }
}

/// Solve both cases on `topology` and compare their worst branches.
pub fn compare_cases(
    params: &NetworkParams,
    topology: &Topology,
    case: &CaseSpec,
) -> SolverResult<ComparisonResult> {
    let (params_a, params_b) = case_params(params, case);
    let system_a = solve(topology, &params_a)?;
    let system_b = solve(topology, &params_b)?;

    let terminal_a = system_a.worst_terminal_mpa;
    let terminal_b = system_b.worst_terminal_mpa;
    let improvement = improvement_pct(terminal_a, terminal_b);

    debug!(
        topology = topology.name(),
        terminal_a_mpa = terminal_a,
        terminal_b_mpa = terminal_b,
        improvement_pct = improvement,
        "Cases compared"
    );

    let worst_profile_a = worst_profile(&system_a)?;
    let worst_profile_b = worst_profile(&system_b)?;

    Ok(ComparisonResult {
        worst_profile_a,
        worst_profile_b,
        terminal_a_mpa: terminal_a,
        terminal_b_mpa: terminal_b,
        improvement_pct: improvement,
        pass_a: terminal_a >= defaults::MIN_TERMINAL_PRESSURE_MPA,
        pass_b: terminal_b >= defaults::MIN_TERMINAL_PRESSURE_MPA,
        worst_branch_a: system_a.worst_branch_index,
        worst_branch_b: system_b.worst_branch_index,
        cross_main_size: system_a.cross_main_size,
        total_heads: system_a.total_heads,
        system_a,
        system_b,
    })
}

fn worst_profile(result: &SolveResult) -> SolverResult<BranchProfile> {
    result
        .worst_profile()
        .cloned()
        .ok_or_else(|| crate::error::SolverError::InvalidState {
            what: "solve produced no branch profiles".into(),
        })
}
