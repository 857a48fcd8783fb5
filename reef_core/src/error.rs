use thiserror::Error;

/// Errors returned by the dosing engine.
///
/// A reading outside the critical band is not an error; it comes back as
/// `DoseStatus::OutOfSafeRange` on an otherwise successful result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DoseError {
    /// Malformed, missing, or out-of-domain input from the caller.
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    /// Reference data is missing or inconsistent (unknown product, unknown parameter, bad catalog).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DoseError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn missing(field: &'static str) -> Self {
        Self::invalid(field, "value is required")
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "InvalidInput",
            Self::Configuration(_) => "ConfigurationError",
        }
    }
}

pub type Result<T> = std::result::Result<T, DoseError>;
