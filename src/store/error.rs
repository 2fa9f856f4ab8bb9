//! Record store error taxonomy

use thiserror::Error;

/// Classified record store failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("store error: {0}")]
    Unknown(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        assert!(StoreError::NotFound("trips/t1".to_string()).is_not_found());
        assert!(!StoreError::Duplicate("trips/t1".to_string()).is_not_found());
    }
}
