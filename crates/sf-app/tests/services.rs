use sf_analysis::{SweepOutcome, SweepRange, SweepVariable};
use sf_app::*;
use sf_project::schema::{ScenarioFile, TopologyDef};

fn small_scenario() -> ScenarioFile {
    let mut scenario = ScenarioFile {
        name: "small".to_string(),
        ..ScenarioFile::default()
    };
    scenario.network.num_branches = 2;
    scenario.network.heads_per_branch = 4;
    scenario.network.total_flow_lpm = 160.0;
    scenario.analysis.monte_carlo.iterations = 10;
    scenario.analysis.bernoulli.iterations = 10;
    scenario.analysis.bernoulli.p_values = vec![0.2, 0.8];
    scenario
}

#[test]
fn solve_with_topology_override() {
    let scenario = small_scenario();
    let tree = run_solve(&scenario, &RunOptions::default()).unwrap();
    let grid = run_solve(
        &scenario,
        &RunOptions {
            topology: Some(TopologyDef::Grid),
            ..RunOptions::default()
        },
    )
    .unwrap();
    println!("tree {:.6} MPa, grid {:.6} MPa", tree.worst_terminal_mpa, grid.worst_terminal_mpa);

    assert!(tree.grid.is_none());
    assert!(grid.converged());
    assert!(grid.worst_terminal_mpa >= tree.worst_terminal_mpa);
}

#[test]
fn compare_and_compliance() {
    let scenario = small_scenario();
    let cmp = run_compare(&scenario, &RunOptions::default()).unwrap();
    assert!(cmp.improvement_pct > 0.0);

    let (result, compliance) = run_compliance(&scenario, &RunOptions::default()).unwrap();
    // 1.4 MPa inlet leaves more than 1.2 MPa at the terminals
    assert!(result.worst_terminal_mpa > 1.2);
    assert!(!compliance.is_compliant);
    assert!(compliance.pressure_violations().count() > 0);
}

#[test]
fn seeded_studies_are_repeatable() {
    let scenario = small_scenario();
    let options = RunOptions {
        seed: Some(99),
        iterations: Some(12),
        ..RunOptions::default()
    };
    let a = run_monte_carlo_study(&scenario, &options).unwrap();
    let b = run_monte_carlo_study(&scenario, &options).unwrap();
    assert_eq!(a.iterations(), 12);
    assert_eq!(a, b);

    let bern = run_bernoulli_study(&scenario, &options).unwrap();
    assert_eq!(bern.levels.len(), 2);
    assert_eq!(bern.seed, 99);
}

#[test]
fn sensitivity_sweep_and_curve() {
    let scenario = small_scenario();
    let options = RunOptions::default();

    let sens = run_sensitivity_study(&scenario, &options).unwrap();
    assert_eq!(sens.single_bead_mpa.len(), 4);

    let sweep = run_sweep(
        &scenario,
        &options,
        SweepVariable::InletPressure,
        SweepRange::new(0.2, 1.0, 0.4),
    )
    .unwrap();
    assert_eq!(sweep.values.len(), 3);
    assert!(matches!(sweep.outcome, SweepOutcome::Cases(_)));

    let curve = run_system_curve(&scenario, &options, Some(400.0), Some(5)).unwrap();
    assert_eq!(curve.len(), 5);
    assert!(curve.windows(2).all(|w| w[1].head_m > w[0].head_m));
    assert!(run_system_curve(&scenario, &options, Some(400.0), Some(1)).is_err());
}

#[test]
fn invalid_scenario_is_a_validation_error() {
    let mut scenario = small_scenario();
    scenario.network.head_spacing_m = -1.0;
    assert!(matches!(validate_scenario(&scenario), Err(AppError::Validation(_))));
    assert!(matches!(
        run_solve(&scenario, &RunOptions::default()),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn save_load_and_summarize() {
    let scenario = small_scenario();
    let path = std::env::temp_dir().join("sf_app_services_small.yaml");
    save_scenario(&path, &scenario).unwrap();
    let loaded = load_scenario(&path).unwrap();
    assert_eq!(loaded, scenario);

    let summary = summarize(&loaded).unwrap();
    assert_eq!(summary.total_heads, 8);
    assert_eq!(summary.cross_main, "65A");
    assert_eq!(summary.topology, "tree");

    let missing = std::env::temp_dir().join("sf_app_services_missing.yaml");
    let _ = std::fs::remove_file(&missing);
    assert!(matches!(
        load_scenario(&missing),
        Err(AppError::ScenarioFile { .. })
    ));
}
