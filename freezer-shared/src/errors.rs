//! Error types used across the freezer inventory engine.

use thiserror::Error;

/// Result type for freezer operations.
pub type FreezerResult<T> = Result<T, FreezerError>;

#[derive(Debug, Error)]
pub enum FreezerError {
    /// Malformed input: empty required field, position outside the grid, occupied cell.
    #[error("validation error: {0}")]
    Validation(String),

    /// Durable store rejected or failed a read or write.
    #[error("store error: {0}")]
    Store(String),

    /// Target box has no free cell.
    #[error("{0}")]
    Capacity(String),

    /// Box or sample not present in the inventory.
    #[error("not found: {0}")]
    NotFound(String),

    /// Sample is in the wrong lifecycle state for the requested operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Stored row could not be mapped onto the entity model.
    #[error("metadata error: {0}")]
    Metadata(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FreezerError {
    /// True for failures raised at the durable store boundary.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, FreezerError::Store(_) | FreezerError::Database(_))
    }
}

// Implement From for common error types to enable `?` operator
impl From<std::io::Error> for FreezerError {
    fn from(err: std::io::Error) -> Self {
        FreezerError::Internal(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for FreezerError {
    fn from(err: serde_json::Error) -> Self {
        FreezerError::Internal(format!("JSON error: {}", err))
    }
}

impl From<String> for FreezerError {
    fn from(err: String) -> Self {
        FreezerError::Internal(err)
    }
}

impl From<&str> for FreezerError {
    fn from(err: &str) -> Self {
        FreezerError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message_is_bare() {
        let err = FreezerError::Capacity("container full".into());
        assert_eq!(err.to_string(), "container full");
    }

    #[test]
    fn test_store_failure_classification() {
        assert!(FreezerError::Store("offline".into()).is_store_failure());
        assert!(FreezerError::Database("locked".into()).is_store_failure());
        assert!(!FreezerError::Validation("empty name".into()).is_store_failure());
    }
}
