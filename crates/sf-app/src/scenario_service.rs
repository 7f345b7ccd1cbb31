//! Scenario loading, saving, validation, and introspection.

use std::path::Path;

use serde::Serialize;
use sf_core::pipes::cross_main_size;
use sf_project::schema::ScenarioFile;

use crate::compile::compile_scenario;
use crate::error::{AppError, AppResult};

/// Summary of a scenario for listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub topology: &'static str,
    pub num_branches: u32,
    pub heads_per_branch: u32,
    pub total_heads: u32,
    pub cross_main: &'static str,
    pub inlet_pressure_mpa: f64,
    pub total_flow_lpm: f64,
}

/// Load a scenario file (YAML, or JSON by extension).
pub fn load_scenario(path: &Path) -> AppResult<ScenarioFile> {
    sf_project::load(path).map_err(|e| match e {
        sf_project::ProjectError::Validation(v) => AppError::Validation(v.to_string()),
        other => AppError::ScenarioFile {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })
}

/// Save a scenario as YAML.
pub fn save_scenario(path: &Path, scenario: &ScenarioFile) -> AppResult<()> {
    sf_project::save_yaml(path, scenario)?;
    Ok(())
}

/// File-level checks plus a full compile of the network inputs.
pub fn validate_scenario(scenario: &ScenarioFile) -> AppResult<()> {
    sf_project::validate_scenario(scenario).map_err(|e| AppError::Validation(e.to_string()))?;
    compile_scenario(scenario)?;
    Ok(())
}

pub fn summarize(scenario: &ScenarioFile) -> AppResult<ScenarioSummary> {
    let rt = compile_scenario(scenario)?;
    let total_heads = rt.params.total_heads();
    Ok(ScenarioSummary {
        name: rt.name,
        topology: rt.topology.name(),
        num_branches: rt.params.num_branches,
        heads_per_branch: rt.params.heads_per_branch,
        total_heads,
        cross_main: cross_main_size(total_heads).label(),
        inlet_pressure_mpa: rt.params.inlet_pressure_mpa,
        total_flow_lpm: rt.params.total_flow_lpm,
    })
}
