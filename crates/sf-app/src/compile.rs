//! Compilation of a `ScenarioFile` into solver and driver inputs.

use sf_analysis::{BernoulliConfig, MonteCarloConfig, SensitivityConfig};
use sf_network::{LossCoefficients, NetworkParams};
use sf_project::schema::{
    AnalysisDef, BernoulliDef, CasesDef, MonteCarloDef, NetworkDef, ScenarioFile,
    SensitivityDef, SolverDef, TopologyDef,
};
use sf_solver::{CaseSpec, HardyCrossConfig, Topology};

use crate::error::AppResult;

/// Everything a run needs, checked and ready to solve.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRuntime {
    pub name: String,
    pub params: NetworkParams,
    pub topology: Topology,
    pub analysis: AnalysisDef,
}

impl ScenarioRuntime {
    pub fn case_spec(&self) -> CaseSpec {
        case_spec(&self.analysis.cases)
    }

    pub fn monte_carlo_config(&self) -> MonteCarloConfig {
        monte_carlo_config(&self.analysis.monte_carlo)
    }

    pub fn bernoulli_config(&self) -> BernoulliConfig {
        bernoulli_config(&self.analysis.bernoulli)
    }

    pub fn sensitivity_config(&self) -> SensitivityConfig {
        sensitivity_config(&self.analysis.sensitivity)
    }
}

/// Compile and validate a scenario.
pub fn compile_scenario(scenario: &ScenarioFile) -> AppResult<ScenarioRuntime> {
    let params = network_params(&scenario.network);
    params.validate()?;
    let topology = topology(&scenario.solver);
    if let Topology::Grid(config) = &topology {
        config.validate()?;
    }
    Ok(ScenarioRuntime {
        name: scenario.name.clone(),
        params,
        topology,
        analysis: scenario.analysis.clone(),
    })
}

pub fn network_params(def: &NetworkDef) -> NetworkParams {
    let params = NetworkParams::new(def.num_branches, def.heads_per_branch)
        .with_spacing(def.branch_spacing_m, def.head_spacing_m)
        .with_inlet_pressure(def.inlet_pressure_mpa)
        .with_total_flow(def.total_flow_lpm)
        .with_weld_beads(def.weld_beads.per_branch, def.weld_beads.height_mm)
        .with_losses(LossCoefficients {
            k1_base: def.losses.k1_base,
            k2: def.losses.k2,
            k3: def.losses.k3,
            k_tee_run: def.losses.k_tee_run,
        });
    match &def.bead_heights_mm {
        Some(grid) => params.with_bead_heights(grid.clone()),
        None if def.bead_height_mm > 0.0 => params.with_uniform_bead_height(def.bead_height_mm),
        None => params,
    }
}

pub fn hardy_cross_config(def: &SolverDef) -> HardyCrossConfig {
    HardyCrossConfig {
        max_iterations: def.max_iterations,
        tolerance_m: def.tolerance_m,
        tolerance_lpm: def.tolerance_lpm,
        relaxation: def.relaxation,
        ..HardyCrossConfig::default()
    }
}

pub fn topology(def: &SolverDef) -> Topology {
    match def.topology {
        TopologyDef::Tree => Topology::Tree,
        TopologyDef::Grid => Topology::Grid(hardy_cross_config(def)),
    }
}

pub fn case_spec(def: &CasesDef) -> CaseSpec {
    CaseSpec {
        bead_height_existing: def.bead_height_existing_mm,
        bead_height_new: def.bead_height_new_mm,
        beads_per_branch: def.beads_per_branch,
    }
}

pub fn monte_carlo_config(def: &MonteCarloDef) -> MonteCarloConfig {
    MonteCarloConfig {
        iterations: def.iterations,
        min_defects: def.min_defects,
        max_defects: def.max_defects,
        bead_height_mm: def.bead_height_mm,
        weld_beads_per_branch: def.weld_beads_per_branch,
        seed: def.seed,
    }
}

pub fn bernoulli_config(def: &BernoulliDef) -> BernoulliConfig {
    BernoulliConfig {
        p_values: def.p_values.clone(),
        iterations: def.iterations,
        bead_height_mm: def.bead_height_mm,
        weld_beads_per_branch: def.weld_beads_per_branch,
        seed: def.seed,
    }
}

pub fn sensitivity_config(def: &SensitivityDef) -> SensitivityConfig {
    SensitivityConfig {
        bead_height_mm: def.bead_height_mm,
        weld_beads_per_branch: def.weld_beads_per_branch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scenario_compiles_to_reference_tree() {
        let rt = compile_scenario(&ScenarioFile::default()).unwrap();
        assert_eq!(rt.topology, Topology::Tree);
        assert_eq!(rt.params.num_branches, 4);
        assert_eq!(rt.params.heads_per_branch, 8);
        assert!(rt.params.bead_heights_mm.is_none());
        assert_eq!(rt.case_spec(), CaseSpec::default());
        assert_eq!(rt.monte_carlo_config(), MonteCarloConfig::default());
        assert_eq!(rt.bernoulli_config(), BernoulliConfig::default());
    }

    #[test]
    fn uniform_bead_and_grid_settings_carry_over() {
        let mut scenario = ScenarioFile::default();
        scenario.network.bead_height_mm = 1.5;
        scenario.solver.topology = TopologyDef::Grid;
        scenario.solver.relaxation = 0.8;

        let rt = compile_scenario(&scenario).unwrap();
        assert_eq!(rt.params.bead_height(3, 7), 1.5);
        match rt.topology {
            Topology::Grid(cfg) => assert_eq!(cfg.relaxation, 0.8),
            Topology::Tree => panic!("expected grid"),
        }
    }
}
