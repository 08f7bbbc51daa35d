//! Error taxonomy shared by the fixture, standings and knockout engines.

use thiserror::Error;

/// Errors raised by the competition engine.
///
/// Every operation either returns a complete, internally consistent result or
/// one of these variants. Nothing is partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompetitionError {
    /// Invalid or insufficient inputs, detected before any computation starts.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Structurally invalid data (duplicate ids, impossible results).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Data references an entity the engine was not told about.
    #[error("Integrity error: {0}")]
    IntegrityError(String),

    /// Operation attempted before its prerequisites are in place.
    #[error("State error: {0}")]
    StateError(String),

    /// Attempt to overwrite an already-resolved outcome.
    #[error("Conflict error: {0}")]
    ConflictError(String),
}

impl CompetitionError {
    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CompetitionError::ConfigurationError(_) => "configuration",
            CompetitionError::ValidationError(_) => "validation",
            CompetitionError::IntegrityError(_) => "integrity",
            CompetitionError::StateError(_) => "state",
            CompetitionError::ConflictError(_) => "conflict",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompetitionError::ConfigurationError("need at least 2 teams".to_string());
        assert_eq!(err.to_string(), "Configuration error: need at least 2 teams");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            CompetitionError::ConflictError(String::new()).kind(),
            "conflict"
        );
        assert_eq!(CompetitionError::StateError(String::new()).kind(), "state");
        assert_eq!(
            CompetitionError::IntegrityError(String::new()).kind(),
            "integrity"
        );
    }
}
