use thiserror::Error;

/// Errors raised by the calculation engines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("{field} {constraint}")]
    InvalidParameter {
        field: &'static str,
        constraint: &'static str,
    },

    #[error("No {kind} data available for '{name}'")]
    UnsupportedCategory { kind: &'static str, name: String },
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn invalid(field: &'static str, constraint: &'static str) -> Self {
        Self::InvalidParameter { field, constraint }
    }
}

/// Rejects anything that is not a finite, strictly positive number.
pub(crate) fn require_positive(field: &'static str, value: f64) -> EngineResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::invalid(field, "must be > 0"));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> EngineResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::invalid(field, "must be >= 0"));
    }
    Ok(())
}
