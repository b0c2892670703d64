/// Errors that stop a projection before any period is computed.
///
/// Outcomes such as bankruptcy or an unreachable FIRE target are not errors;
/// they are reported as result data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FireplanError {
    /// A required input was left empty
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    /// An input was present but outside its allowed range
    #[error("invalid value for `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// A returns provider was configured with unusable distribution parameters
    #[error("invalid {series} distribution: {reason}")]
    InvalidDistributionParameters {
        series: &'static str,
        reason: &'static str,
    },

    /// A batch was cancelled through its progress handle
    #[error("simulation cancelled")]
    Cancelled,

    /// A multi-run batch was requested with zero runs
    #[error("a simulation batch needs at least one run")]
    EmptyBatch,
}

pub type FireplanResult<T> = Result<T, FireplanError>;

impl FireplanError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        FireplanError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
