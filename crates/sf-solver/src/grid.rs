//! Grid topology: Hardy-Cross, node pressures, then per-branch profiles.

use sf_network::{GridNetwork, NetworkParams, PipeKind};
use tracing::debug;

use crate::error::SolverResult;
use crate::hardy_cross::{FlowSeed, HardyCrossConfig, hardy_cross};
use crate::pressure::{node_pressures, node_table};
use crate::profile::{BranchProfile, blocked_fittings, fed_branch_profile};
use crate::result::{GridDiagnostics, SolveResult, TopologyKind, worst_terminal};

/// Validate `params`, build the grid and solve it from the balanced seed.
pub fn solve_grid(params: &NetworkParams, config: &HardyCrossConfig) -> SolverResult<SolveResult> {
    let net = GridNetwork::build(params)?;
    solve_grid_network(&net, config, &FlowSeed::Balanced)
}

/// Pressures of an already built grid.
///
/// Pressures are derived whatever the Hardy-Cross outcome; the outcome is
/// reported in `SolveResult::grid`.
pub fn solve_grid_network(
    net: &GridNetwork,
    config: &HardyCrossConfig,
    seed: &FlowSeed,
) -> SolverResult<SolveResult> {
    let hc = hardy_cross(net, config, seed)?;
    let flows = &hc.flows;
    let pressures = node_pressures(net, flows)?;

    let mut inlet_pressures = Vec::with_capacity(net.num_branches);
    let mut profiles: Vec<BranchProfile> = Vec::with_capacity(net.num_branches);
    for branch in &net.branches {
        let pid = net.branch_pipe(branch.index);
        let draw = net.topology.pipe(pid).map_or(branch.design_flow_lpm, |p| p.draw_lpm);
        let top_inflow = flows[pid.idx()];
        let p_top = pressures[net.top_node(branch.index + 1).idx()];
        inlet_pressures.push(p_top);
        profiles.push(fed_branch_profile(branch, p_top, top_inflow, draw, &net.losses));
    }

    let cross_main_losses: Vec<f64> = (0..net.num_branches)
        .map(|i| {
            if i == 0 {
                0.0
            } else {
                (pressures[net.top_node(i).idx()] - pressures[net.top_node(i + 1).idx()]).abs()
            }
        })
        .collect();
    let cumulative = cross_main_losses.iter().sum();

    let terminals: Vec<f64> = profiles.iter().map(|p| p.terminal_pressure_mpa).collect();
    let (worst_index, worst_value) = worst_terminal(&terminals);

    let blocked: Vec<_> = net.branches.iter().flat_map(blocked_fittings).collect();
    crate::report_blocked(&blocked);

    let max_cross_main_flow_lpm = net
        .topology
        .pipes()
        .iter()
        .filter(|p| p.kind.is_cross_main())
        .map(|p| flows[p.id.idx()].abs())
        .fold(0.0, f64::max);

    debug!(
        branches = net.num_branches,
        iterations = hc.iterations,
        outcome = ?hc.outcome,
        worst_branch = worst_index,
        worst_terminal_mpa = worst_value,
        "Grid solved"
    );

    let diagnostics = GridDiagnostics {
        iterations: hc.iterations,
        final_imbalance_m: hc.final_imbalance_m,
        final_delta_q_lpm: hc.final_delta_q_lpm,
        converged: hc.converged(),
        diverged: hc.diverged(),
        outcome: hc.outcome,
        nodes: node_table(net, flows, &pressures),
        pipe_flows_lpm: hc.flows.clone(),
        max_cross_main_flow_lpm,
        imbalance_history: hc.imbalance_history,
        delta_q_history: hc.delta_q_history,
    };

    Ok(SolveResult {
        topology: TopologyKind::Grid,
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
        grid: Some(diagnostics),
    })
}

/// TOP-end inflow of every branch pipe, in branch order.
pub fn branch_flows(net: &GridNetwork, flows: &[f64]) -> Vec<f64> {
    net.topology
        .pipes()
        .iter()
        .filter_map(|p| match p.kind {
            PipeKind::Branch { .. } => flows.get(p.id.idx()).copied(),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_beats_tree_on_default_inputs() {
        let params = NetworkParams::default();
        let grid = solve_grid(&params, &HardyCrossConfig::default()).unwrap();
        let tree = crate::tree::solve_tree(&params).unwrap();
        assert!(grid.converged());
        assert!(grid.worst_terminal_mpa >= tree.worst_terminal_mpa);
        assert_eq!(grid.total_heads, 32);
        assert_eq!(grid.cross_main_losses_mpa[0], 0.0);
    }

    #[test]
    fn branch_discharge_adds_up_to_supply() {
        let params = NetworkParams::new(3, 6).with_total_flow(300.0);
        let net = GridNetwork::build(&params).unwrap();
        let res = solve_grid_network(&net, &HardyCrossConfig::default(), &FlowSeed::Balanced).unwrap();
        assert!(res.converged());
        let diag = res.grid.as_ref().unwrap();

        let discharge: f64 = res.branch_profiles.iter().map(|p| p.flow_lpm).sum();
        assert!((discharge - 300.0).abs() < 1e-9);

        let top = branch_flows(&net, &diag.pipe_flows_lpm);
        assert_eq!(top.len(), 3);
        for (prof, q) in res.branch_profiles.iter().zip(&top) {
            assert!((prof.top_inflow_lpm() - q).abs() < 1e-12);
            // fed from both cross-mains
            assert!(*q > 0.0 && prof.bottom_inflow_lpm > 0.0, "branch {}", prof.branch_index);
        }

        let top_feed = diag.pipe_flows_lpm[net.top_pipe(0).idx()];
        let bottom_feed = diag.pipe_flows_lpm[net.left_connector().idx()];
        assert!((top_feed + bottom_feed - 300.0).abs() < 1e-6);
    }

    #[test]
    fn far_end_pressure_closes_on_the_bottom_node() {
        let params = NetworkParams::default();
        let net = GridNetwork::build(&params).unwrap();
        let res = solve_grid_network(&net, &HardyCrossConfig::default(), &FlowSeed::Balanced).unwrap();
        let diag = res.grid.as_ref().unwrap();
        for prof in &res.branch_profiles {
            let bottom = &diag.nodes[net.bottom_node(prof.branch_index + 1).idx()];
            let last = prof.pressures_mpa[prof.pressures_mpa.len() - 1];
            // the far-end entry loss is the only gap left
            assert!(bottom.pressure_mpa > last);
            assert!(bottom.pressure_mpa - last < 0.01);
            assert!(prof.terminal_pressure_mpa <= last);
        }
    }
}
