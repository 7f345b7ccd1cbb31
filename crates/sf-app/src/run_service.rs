//! Run execution: one function per study, all starting from a scenario.

use sf_analysis::{
    BernoulliResult, MonteCarloResult, SensitivityResult, SweepConfig, SweepRange, SweepResult,
    SweepVariable, run_bernoulli_monte_carlo, run_monte_carlo, run_sensitivity,
    run_variable_sweep,
};
use sf_project::schema::{ScenarioFile, TopologyDef};
use sf_solver::{
    ComparisonResult, ComplianceResult, CurvePoint, SolveResult, SystemCurve, check_compliance,
    compare_cases, solve,
};
use tracing::info;

use crate::compile::{ScenarioRuntime, compile_scenario};
use crate::error::{AppError, AppResult};

/// Overrides applied on top of the scenario file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub topology: Option<TopologyDef>,
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
}

fn runtime(scenario: &ScenarioFile, options: &RunOptions) -> AppResult<ScenarioRuntime> {
    let mut scenario = scenario.clone();
    if let Some(topology) = options.topology {
        scenario.solver.topology = topology;
    }
    if let Some(iterations) = options.iterations {
        scenario.analysis.monte_carlo.iterations = iterations;
    }
    if let Some(seed) = options.seed {
        scenario.analysis.monte_carlo.seed = Some(seed);
        scenario.analysis.bernoulli.seed = Some(seed);
    }
    let rt = compile_scenario(&scenario)?;
    info!(scenario = %rt.name, topology = rt.topology.name(), "Scenario compiled");
    Ok(rt)
}

pub fn run_solve(scenario: &ScenarioFile, options: &RunOptions) -> AppResult<SolveResult> {
    let rt = runtime(scenario, options)?;
    Ok(solve(&rt.topology, &rt.params)?)
}

pub fn run_compare(scenario: &ScenarioFile, options: &RunOptions) -> AppResult<ComparisonResult> {
    let rt = runtime(scenario, options)?;
    Ok(compare_cases(&rt.params, &rt.topology, &rt.case_spec())?)
}

pub fn run_compliance(
    scenario: &ScenarioFile,
    options: &RunOptions,
) -> AppResult<(SolveResult, ComplianceResult)> {
    let result = run_solve(scenario, options)?;
    let compliance = check_compliance(&result);
    Ok((result, compliance))
}

pub fn run_monte_carlo_study(
    scenario: &ScenarioFile,
    options: &RunOptions,
) -> AppResult<MonteCarloResult> {
    let rt = runtime(scenario, options)?;
    Ok(run_monte_carlo(&rt.monte_carlo_config(), &rt.params, &rt.topology)?)
}

pub fn run_bernoulli_study(
    scenario: &ScenarioFile,
    options: &RunOptions,
) -> AppResult<BernoulliResult> {
    let rt = runtime(scenario, options)?;
    Ok(run_bernoulli_monte_carlo(&rt.bernoulli_config(), &rt.params, &rt.topology)?)
}

pub fn run_sensitivity_study(
    scenario: &ScenarioFile,
    options: &RunOptions,
) -> AppResult<SensitivityResult> {
    let rt = runtime(scenario, options)?;
    Ok(run_sensitivity(&rt.sensitivity_config(), &rt.params, &rt.topology)?)
}

pub fn run_sweep(
    scenario: &ScenarioFile,
    options: &RunOptions,
    variable: SweepVariable,
    range: SweepRange,
) -> AppResult<SweepResult> {
    let rt = runtime(scenario, options)?;
    let config = SweepConfig {
        case: rt.case_spec(),
        monte_carlo: rt.monte_carlo_config(),
        ..SweepConfig::new(variable, range)
    };
    Ok(run_variable_sweep(&config, &rt.params, &rt.topology)?)
}

/// System head curve; `max_flow_lpm` and `points` fall back to the scenario.
pub fn run_system_curve(
    scenario: &ScenarioFile,
    options: &RunOptions,
    max_flow_lpm: Option<f64>,
    points: Option<usize>,
) -> AppResult<Vec<CurvePoint>> {
    let rt = runtime(scenario, options)?;
    let q_max = max_flow_lpm.unwrap_or(rt.analysis.system_curve.max_flow_lpm);
    let points = points.unwrap_or(rt.analysis.system_curve.points);
    if !(q_max.is_finite() && q_max > 0.0) || points < 2 {
        return Err(AppError::InvalidInput(format!(
            "system curve needs a positive max flow and at least 2 points (got {q_max}, {points})"
        )));
    }
    let curve = SystemCurve::new(&rt.params, rt.topology);
    Ok(curve.curve(q_max, points)?)
}
