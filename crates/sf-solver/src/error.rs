//! Error types for solver operations.

use sf_core::SfError;
use sf_network::NetworkError;
use thiserror::Error;

/// Errors that can occur while solving a network.
///
/// Non-convergence is not an error: it is reported in `GridDiagnostics`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Invalid state: {what}")]
    InvalidState { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for SfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::Network(err) => err.into(),
            SolverError::InvalidState { what } => SfError::Invariant { what },
            SolverError::Numeric { what } => SfError::Numeric { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_detail_survives_conversion() {
        let err = SolverError::Numeric {
            what: "loop head imbalance is NaN at iteration 7".into(),
        };
        let core: SfError = err.into();
        assert_eq!(
            core,
            SfError::Numeric {
                what: "loop head imbalance is NaN at iteration 7".into()
            }
        );
        assert!(core.to_string().contains("iteration 7"));
    }

    #[test]
    fn invalid_state_maps_to_invariant() {
        let core: SfError = SolverError::InvalidState { what: "node 3".into() }.into();
        assert!(matches!(core, SfError::Invariant { what } if what == "node 3"));
    }
}
