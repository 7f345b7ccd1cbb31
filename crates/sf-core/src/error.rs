use thiserror::Error;

pub type SfResult<T> = Result<T, SfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },

    #[error("Numeric failure: {what}")]
    Numeric { what: String },
}
