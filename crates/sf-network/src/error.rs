//! Network construction and validation errors.

use sf_core::SfError;

/// Input validation and topology errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// A parameter is outside its accepted range.
    Validation {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The grid graph is malformed (dangling endpoint, open loop, wrong cycle rank, ...).
    Topology { what: String },
}

impl NetworkError {
    pub(crate) fn invalid(field: &'static str, value: impl ToString, reason: &'static str) -> Self {
        NetworkError::Validation {
            field,
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn topology(what: impl Into<String>) -> Self {
        NetworkError::Topology { what: what.into() }
    }
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::Validation {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid {} = {}: {}", field, value, reason)
            }
            NetworkError::Topology { what } => {
                write!(f, "Invalid grid topology: {}", what)
            }
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<NetworkError> for SfError {
    fn from(err: NetworkError) -> Self {
        SfError::Invariant {
            what: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_field_and_value() {
        let err = NetworkError::invalid("num_branches", 0, "must be at least 1");
        assert_eq!(err.to_string(), "Invalid num_branches = 0: must be at least 1");
    }

    #[test]
    fn converts_into_core_error() {
        let err: SfError = NetworkError::topology("loop 2 does not close").into();
        assert!(matches!(err, SfError::Invariant { .. }));
    }
}
