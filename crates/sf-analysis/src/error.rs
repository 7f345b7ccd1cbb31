//! Error types for the statistical drivers.

use sf_network::NetworkError;
use sf_solver::SolverError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Invalid analysis configuration: {what}")]
    InvalidConfig { what: String },
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl AnalysisError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        Self::InvalidConfig { what: what.into() }
    }
}

impl From<NetworkError> for AnalysisError {
    fn from(e: NetworkError) -> Self {
        Self::Solver(e.into())
    }
}
