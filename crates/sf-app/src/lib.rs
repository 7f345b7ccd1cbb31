//! Shared application service layer for sprinkflow.
//!
//! Turns scenario files into solver and driver inputs and runs the studies,
//! so the CLI stays a thin argument parser.

pub mod compile;
pub mod error;
pub mod run_service;
pub mod scenario_service;

pub use compile::{ScenarioRuntime, compile_scenario};
pub use error::{AppError, AppResult};
pub use run_service::{
    RunOptions, run_bernoulli_study, run_compare, run_compliance, run_monte_carlo_study,
    run_sensitivity_study, run_solve, run_sweep, run_system_curve,
};
pub use scenario_service::{
    ScenarioSummary, load_scenario, save_scenario, summarize, validate_scenario,
};
