use sf_project::schema::*;
use sf_project::{
    ProjectError, ValidationError, from_yaml_str, load, load_json, load_yaml, save_json, save_yaml,
    validate_scenario,
};

fn custom_scenario() -> ScenarioFile {
    ScenarioFile {
        version: LATEST_VERSION,
        name: "Warehouse grid".to_string(),
        network: NetworkDef {
            num_branches: 6,
            heads_per_branch: 10,
            inlet_pressure_mpa: 0.8,
            total_flow_lpm: 1200.0,
            bead_heights_mm: Some(vec![vec![1.5; 10]; 6]),
            weld_beads: WeldBeadsDef {
                per_branch: 4,
                height_mm: 2.0,
            },
            ..NetworkDef::default()
        },
        solver: SolverDef {
            topology: TopologyDef::Grid,
            relaxation: 0.7,
            ..SolverDef::default()
        },
        analysis: AnalysisDef {
            monte_carlo: MonteCarloDef {
                iterations: 250,
                seed: Some(42),
                ..MonteCarloDef::default()
            },
            ..AnalysisDef::default()
        },
    }
}

#[test]
fn roundtrip_yaml_default_scenario() {
    let scenario = ScenarioFile::default();
    validate_scenario(&scenario).unwrap();

    let path = std::env::temp_dir().join("sf_project_roundtrip_default.yaml");
    save_yaml(&path, &scenario).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(scenario, loaded);
}

#[test]
fn roundtrip_yaml_custom_scenario() {
    let scenario = custom_scenario();
    let path = std::env::temp_dir().join("sf_project_roundtrip_custom.yaml");
    save_yaml(&path, &scenario).unwrap();
    let loaded = load(&path).unwrap();
    assert_eq!(scenario, loaded);
}

#[test]
fn roundtrip_json_custom_scenario() {
    let scenario = custom_scenario();
    let path = std::env::temp_dir().join("sf_project_roundtrip_custom.json");
    save_json(&path, &scenario).unwrap();
    assert_eq!(load_json(&path).unwrap(), scenario);
    assert_eq!(load(&path).unwrap(), scenario);
}

#[test]
fn partial_file_takes_defaults() {
    let yaml = r#"
name: Small office
network:
  num_branches: 2
  total_flow_lpm: 160.0
solver:
  topology: grid
"#;
    let scenario = from_yaml_str(yaml).unwrap();
    println!("{scenario:#?}");

    assert_eq!(scenario.version, LATEST_VERSION);
    assert_eq!(scenario.network.num_branches, 2);
    assert_eq!(scenario.network.heads_per_branch, 8);
    assert_eq!(scenario.network.inlet_pressure_mpa, 1.4);
    assert_eq!(scenario.solver.topology, TopologyDef::Grid);
    assert_eq!(scenario.solver.relaxation, 0.5);
    assert_eq!(scenario.analysis.bernoulli.p_values, vec![0.1, 0.3, 0.5, 0.7, 0.9]);
}

#[test]
fn invalid_values_are_rejected_on_load_and_save() {
    let yaml = "network:\n  heads_per_branch: 0\n";
    match from_yaml_str(yaml) {
        Err(ProjectError::Validation(ValidationError::InvalidValue { field, .. })) => {
            assert_eq!(field, "network.heads_per_branch")
        }
        other => panic!("expected a validation error, got {other:?}"),
    }

    let mut scenario = ScenarioFile::default();
    scenario.solver.relaxation = 1.5;
    let path = std::env::temp_dir().join("sf_project_rejected.yaml");
    assert!(matches!(
        save_yaml(&path, &scenario),
        Err(ProjectError::Validation(_))
    ));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    assert!(matches!(
        from_yaml_str("network: [1, 2"),
        Err(ProjectError::Yaml(_))
    ));
}
