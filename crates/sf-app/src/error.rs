//! Error types for the sf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// behind one interface for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Failed to load scenario file {path}: {message}")]
    ScenarioFile { path: PathBuf, message: String },

    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to write output: {0}")]
    Output(String),
}

/// Result type for sf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<sf_project::ProjectError> for AppError {
    fn from(err: sf_project::ProjectError) -> Self {
        match err {
            sf_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Scenario(other.to_string()),
        }
    }
}

impl From<sf_network::NetworkError> for AppError {
    fn from(err: sf_network::NetworkError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<sf_solver::SolverError> for AppError {
    fn from(err: sf_solver::SolverError) -> Self {
        match err {
            sf_solver::SolverError::Network(e) => e.into(),
            other => AppError::Solver(other.to_string()),
        }
    }
}

impl From<sf_analysis::AnalysisError> for AppError {
    fn from(err: sf_analysis::AnalysisError) -> Self {
        match err {
            sf_analysis::AnalysisError::Solver(e) => e.into(),
            other => AppError::Analysis(other.to_string()),
        }
    }
}
