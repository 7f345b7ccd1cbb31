//! Tree topology: cross-main walk then per-branch profiles.

use sf_core::units::constants::ROUGHNESS_M;
use sf_core::head_to_mpa;
use sf_hydraulics::{friction_factor, major_loss, minor_loss, reynolds_water, velocity_from_lpm};
use sf_network::{NetworkParams, TreeNetwork};
use tracing::debug;

use crate::error::SolverResult;
use crate::profile::{BranchProfile, blocked_fittings, branch_profile};
use crate::result::{SolveResult, TopologyKind, worst_terminal};

/// Validate `params`, build the tree and solve it.
pub fn solve_tree(params: &NetworkParams) -> SolverResult<SolveResult> {
    let net = TreeNetwork::build(params)?;
    Ok(solve_tree_network(&net))
}

/// Pressures of an already built tree.
///
/// Branch `i > 0` is reached after `branch_spacing` of cross-main carrying
/// `Q - i Q/n` plus one tee-run; branch 0 sits at the inlet.
pub fn solve_tree_network(net: &TreeNetwork) -> SolveResult {
    let mut inlet_pressures = Vec::with_capacity(net.num_branches);
    let mut cross_main_losses = Vec::with_capacity(net.num_branches);
    let mut cumulative = 0.0;
    let mut p = net.inlet_pressure_mpa;

    for seg in &net.cross_main_segments {
        let loss = if seg.index > 0 {
            let d = seg.inner_diameter_m;
            let v = velocity_from_lpm(seg.flow_lpm, d);
            let f = friction_factor(reynolds_water(v, d), ROUGHNESS_M, d);
            head_to_mpa(major_loss(f, seg.length_m, d, v) + minor_loss(net.losses.k_tee_run, v))
        } else {
            0.0
        };
        cumulative += loss;
        p -= loss;
        inlet_pressures.push(p);
        cross_main_losses.push(loss);
    }

    let profiles: Vec<BranchProfile> = net
        .branches
        .iter()
        .zip(&inlet_pressures)
        .map(|(branch, &p_in)| branch_profile(branch, p_in, branch.design_flow_lpm, &net.losses))
        .collect();
    let terminals: Vec<f64> = profiles.iter().map(|p| p.terminal_pressure_mpa).collect();
    let (worst_index, worst_value) = worst_terminal(&terminals);

    let blocked: Vec<_> = net.branches.iter().flat_map(blocked_fittings).collect();
    crate::report_blocked(&blocked);

    debug!(
        branches = net.num_branches,
        heads = net.total_heads(),
        worst_branch = worst_index,
        worst_terminal_mpa = worst_value,
        "Tree solved"
    );

    SolveResult {
        topology: TopologyKind::Tree,
        branch_profiles: profiles,
        branch_inlet_pressures_mpa: inlet_pressures,
        terminal_pressures_mpa: terminals,
        worst_branch_index: worst_index,
        worst_terminal_mpa: worst_value,
        total_heads: net.total_heads(),
        cross_main_size: net.cross_main_size,
        cross_main_losses_mpa: cross_main_losses,
        cross_main_cumulative_mpa: cumulative,
        blocked_fittings: blocked,
        grid: None,
    }
}
