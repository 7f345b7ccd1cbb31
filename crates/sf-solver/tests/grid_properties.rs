//! Conservation and determinism of the grid solver.

use proptest::prelude::*;
use sf_network::{GridNetwork, NetworkParams};
use sf_solver::hardy_cross::pipe_head_drop;
use sf_solver::{FlowSeed, HardyCrossConfig, Topology, solve, solve_grid_network, solve_tree};

fn converged_grid(n: u32, q: f64) -> (GridNetwork, Vec<f64>) {
    let net = GridNetwork::build(&NetworkParams::new(n, 8).with_total_flow(q)).unwrap();
    let res = solve_grid_network(&net, &HardyCrossConfig::default(), &FlowSeed::Balanced).unwrap();
    let diag = res.grid.unwrap();
    assert!(diag.converged, "n={n}, q={q}: {:?}", diag.outcome);
    (net, diag.pipe_flows_lpm)
}

#[test]
fn mass_is_conserved_at_every_node() {
    let tol = HardyCrossConfig::default().tolerance_lpm;
    for (n, q) in [(1, 100.0), (2, 400.0), (2, 1200.0), (4, 400.0)] {
        let (net, flows) = converged_grid(n, q);
        for (node, b) in net.topology.nodes().iter().zip(net.node_balances(&flows)) {
            assert!(b.abs() < tol, "n={n}, q={q}: {} off by {b}", node.label());
        }
    }
}

#[test]
fn energy_is_conserved_around_every_loop() {
    let tol = HardyCrossConfig::default().tolerance_m;
    for (n, q) in [(1, 400.0), (2, 100.0), (4, 400.0), (4, 1200.0)] {
        let (net, flows) = converged_grid(n, q);
        for lp in net.topology.loops() {
            let sum: f64 = lp
                .members()
                .map(|(pid, dir)| {
                    let pipe = &net.topology.pipes()[pid.idx()];
                    pipe_head_drop(&net, pipe, flows[pid.idx()]).drop_m * dir
                })
                .sum();
            assert!(sum.abs() < tol, "n={n}, q={q}: loop {} sums to {sum}", lp.id);
        }
    }
}

#[test]
fn seed_splits_supply_evenly() {
    let net = GridNetwork::build(&NetworkParams::default()).unwrap();
    let seed = net.balanced_flows();
    let top = seed[net.top_pipe(0).idx()];
    let bottom_feed = seed[net.left_connector().idx()];
    assert_eq!(top, 200.0);
    assert_eq!(bottom_feed, 200.0);
    assert_eq!(seed[net.right_connector().idx()], 0.0);
}

#[test]
fn converged_flows_do_not_depend_on_seed() {
    let net = GridNetwork::build(&NetworkParams::default()).unwrap();
    let config = HardyCrossConfig::default();
    let base = solve_grid_network(&net, &config, &FlowSeed::Balanced).unwrap();

    for shift in [5.0, -5.0, 20.0] {
        let mut flows = net.balanced_flows();
        for lp in net.topology.loops() {
            for (pid, dir) in lp.members() {
                flows[pid.idx()] += shift * dir;
            }
        }
        let other = solve_grid_network(&net, &config, &FlowSeed::Custom(flows)).unwrap();
        let (a, b) = (base.grid.as_ref().unwrap(), other.grid.as_ref().unwrap());
        assert!(b.converged, "shift {shift}: {:?}", b.outcome);
        for (qa, qb) in a.pipe_flows_lpm.iter().zip(&b.pipe_flows_lpm) {
            assert!((qa - qb).abs() < 0.01, "shift {shift}: {qa} vs {qb}");
        }
        assert!((base.worst_terminal_mpa - other.worst_terminal_mpa).abs() < 1e-5);
    }
}

#[test]
fn repeated_solves_are_identical() {
    let params = NetworkParams::default().with_uniform_bead_height(1.5).with_weld_beads(5, 1.5);
    for topology in [Topology::Tree, Topology::grid()] {
        let a = solve(&topology, &params).unwrap();
        let b = solve(&topology, &params).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn node_table_matches_flows() {
    let params = NetworkParams::new(3, 5);
    let res = solve(&Topology::grid(), &params).unwrap();
    let diag = res.grid.unwrap();
    assert_eq!(diag.nodes.len(), 8);
    let inlet = diag.nodes.iter().find(|n| n.is_inlet).unwrap();
    assert_eq!(inlet.label, "TOP-0");
    assert_eq!(inlet.pressure_mpa, params.inlet_pressure_mpa);
    for node in &diag.nodes {
        assert_eq!(node.demand_lpm, 0.0);
        assert!(node.balance_lpm.abs() < 1e-3, "{}: {}", node.label, node.balance_lpm);
    }
    let discharge: f64 = res.branch_profiles.iter().map(|p| p.flow_lpm).sum();
    assert!((discharge - params.total_flow_lpm).abs() < 1e-9);
}

#[test]
fn conventional_case_converges_on_the_reference_grid() {
    let params = NetworkParams::default()
        .with_uniform_bead_height(1.5)
        .with_weld_beads(5, 1.5);
    let res = solve(&Topology::grid(), &params).unwrap();
    let diag = res.grid.as_ref().unwrap();
    assert!(diag.converged, "{:?} after {}", diag.outcome, diag.iterations);
    assert!(diag.iterations < 1000);

    let inflow: f64 = res
        .branch_profiles
        .iter()
        .map(|p| p.top_inflow_lpm() + p.bottom_inflow_lpm)
        .sum();
    assert!((inflow - params.total_flow_lpm).abs() < 1e-6);
    for p in &res.branch_profiles {
        assert!(p.top_inflow_lpm() > 0.0 && p.bottom_inflow_lpm > 0.0);
    }
}

#[test]
fn larger_grids_converge() {
    // 12.5 LPM per head, as on the reference system
    for (n, m, bead) in [(8, 8, 0.0), (50, 10, 0.0), (50, 10, 1.5)] {
        let heads = f64::from(n * m);
        let params = NetworkParams::new(n, m)
            .with_total_flow(12.5 * heads)
            .with_uniform_bead_height(bead);
        let res = solve(&Topology::grid(), &params).unwrap();
        let diag = res.grid.as_ref().unwrap();
        assert!(diag.converged, "{n}x{m}: {:?} after {}", diag.outcome, diag.iterations);
        let discharge: f64 = res.branch_profiles.iter().map(|p| p.flow_lpm).sum();
        assert!((discharge - 12.5 * heads).abs() < 1e-6);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn taller_beads_never_raise_terminal(
        n in 1u32..6,
        m in 1u32..12,
        lo in 0.0_f64..5.0,
        extra in 0.0_f64..5.0,
    ) {
        let base = NetworkParams::new(n, m);
        let a = solve_tree(&base.clone().with_uniform_bead_height(lo)).unwrap();
        let b = solve_tree(&base.with_uniform_bead_height(lo + extra)).unwrap();
        prop_assert!(b.worst_terminal_mpa <= a.worst_terminal_mpa);
        for (pa, pb) in a.terminal_pressures_mpa.iter().zip(&b.terminal_pressures_mpa) {
            prop_assert!(pb <= pa);
        }
    }

    #[test]
    fn tree_terminals_fall_along_cross_main(
        n in 1u32..20,
        m in 1u32..20,
        q in 10.0_f64..2000.0,
        bead in 0.0_f64..3.0,
    ) {
        let params = NetworkParams::new(n, m).with_total_flow(q).with_uniform_bead_height(bead);
        let res = solve_tree(&params).unwrap();
        for pair in res.terminal_pressures_mpa.windows(2) {
            prop_assert!(pair[1] <= pair[0]);
        }
        prop_assert_eq!(res.worst_branch_index, n as usize - 1);
    }
}
