//! End-to-end scenarios on the reference 4 x 8 system.

use sf_core::PipeSize;
use sf_network::NetworkParams;
use sf_solver::{
    CaseSpec, FittingLocation, HardyCrossConfig, Topology, Violation, check_compliance,
    compare_cases, solve, solve_grid, solve_tree,
};

fn reference() -> NetworkParams {
    NetworkParams::new(4, 8)
        .with_spacing(3.5, 2.3)
        .with_inlet_pressure(1.4)
        .with_total_flow(400.0)
}

#[test]
fn scenario_tree_reference() {
    let res = solve_tree(&reference()).unwrap();
    println!("terminals: {:?}", res.terminal_pressures_mpa);

    assert_eq!(res.total_heads, 32);
    assert_eq!(res.cross_main_size, PipeSize::A80);
    assert_eq!(res.worst_branch_index, 3);
    assert!(res.worst_terminal_mpa > 0.0 && res.worst_terminal_mpa < 1.4);
    for pair in res.terminal_pressures_mpa.windows(2) {
        assert!(pair[1] <= pair[0], "terminals must not rise along the cross-main");
    }
}

#[test]
fn scenario_case_comparison() {
    let cmp = compare_cases(&reference(), &Topology::Tree, &CaseSpec::default()).unwrap();
    println!(
        "A = {:.6} MPa, B = {:.6} MPa, improvement = {:.4}%",
        cmp.terminal_a_mpa, cmp.terminal_b_mpa, cmp.improvement_pct
    );
    assert!(cmp.terminal_b_mpa > cmp.terminal_a_mpa);
    assert!(cmp.improvement_pct > 0.0);
    assert_eq!(cmp.total_heads, 32);
    assert_eq!(cmp.cross_main_size, PipeSize::A80);
}

#[test]
fn scenario_grid_case_comparison() {
    let case = CaseSpec {
        beads_per_branch: 5,
        ..CaseSpec::default()
    };
    let cmp = compare_cases(&reference(), &Topology::grid(), &case).unwrap();
    println!(
        "grid A = {:.6} MPa, B = {:.6} MPa, improvement = {:.4}%",
        cmp.terminal_a_mpa, cmp.terminal_b_mpa, cmp.improvement_pct
    );
    assert!(cmp.system_a.converged() && cmp.system_b.converged());
    assert!(cmp.terminal_b_mpa > cmp.terminal_a_mpa);
    assert!(cmp.improvement_pct > 0.0);

    for system in [&cmp.system_a, &cmp.system_b] {
        let discharge: f64 = system.branch_profiles.iter().map(|p| p.flow_lpm).sum();
        assert!((discharge - 400.0).abs() < 1e-6);
    }
}

#[test]
fn scenario_grid_not_worse_than_tree() {
    let tree = solve_tree(&reference()).unwrap();
    let grid = solve_grid(&reference(), &HardyCrossConfig::default()).unwrap();
    println!(
        "tree worst = {:.6}, grid worst = {:.6}",
        tree.worst_terminal_mpa, grid.worst_terminal_mpa
    );
    assert!(grid.worst_terminal_mpa >= tree.worst_terminal_mpa);
}

#[test]
fn scenario_grid_converges() {
    let res = solve_grid(&reference(), &HardyCrossConfig::default()).unwrap();
    let diag = res.grid.as_ref().expect("grid diagnostics");
    println!("iterations = {}, outcome = {:?}", diag.iterations, diag.outcome);
    assert!(diag.converged);
    assert!(!diag.diverged);
    assert!(diag.iterations < 1000);
    assert!(diag.final_imbalance_m < 0.001);
    assert!(diag.final_delta_q_lpm < 0.0001);
}

#[test]
fn scenario_weld_beads_cost_pressure() {
    let clean = solve_tree(&reference()).unwrap();
    let beaded = solve_tree(&reference().with_weld_beads(5, 1.5)).unwrap();
    assert!(beaded.worst_terminal_mpa < clean.worst_terminal_mpa);

    // the grid softens the effect but does not cancel it
    let grid = Topology::grid();
    let clean = solve(&grid, &reference()).unwrap();
    let beaded = solve(&grid, &reference().with_weld_beads(5, 1.5)).unwrap();
    assert!(clean.converged() && beaded.converged());
    assert!(beaded.worst_terminal_mpa < clean.worst_terminal_mpa);
}

#[test]
fn scenario_blocking_bead_is_flagged() {
    // 15 mm closes the 25A bore (26.64 mm) but not 32A and up
    let params = reference().with_uniform_bead_height(15.0);
    for topology in [Topology::Tree, Topology::grid()] {
        let res = solve(&topology, &params).unwrap();
        assert!(res.worst_terminal_mpa.is_finite());
        assert_eq!(res.blocked_fittings.len(), 8, "{}", topology.name());
        assert!(res
            .blocked_fittings
            .iter()
            .all(|b| matches!(b.location, FittingLocation::Fitting { head } if head >= 6)));

        let check = check_compliance(&res);
        assert!(!check.is_compliant);
        let blocked = check
            .violations
            .iter()
            .filter(|v| matches!(v, Violation::BlockedFitting { .. }))
            .count();
        assert_eq!(blocked, 8);
    }
}
