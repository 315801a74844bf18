//! Error types for page mutation operations
//!
//! Every failure is reported to the caller. Nothing here is retried; retry
//! policy belongs to whatever task tier drives the engine.

use thiserror::Error;

use crate::storage::StorageError;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, MutationError>;

/// Page mutation error type
#[derive(Debug, Error)]
pub enum MutationError {
    /// Malformed caller input, raised before anything is written
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Page number outside 1..=page_count of its source
    #[error("Invalid page index: page {number} is outside 1..={page_count}")]
    InvalidPageIndex { number: usize, page_count: usize },

    /// Paginated artifact could not be opened, parsed or written
    #[error("Artifact IO error: {0}")]
    ArtifactIo(String),

    /// Per-page recognition artifact copy failed
    #[error("Storage copy error: {0}")]
    StorageCopy(#[from] StorageError),

    /// Document lifecycle collaborator failed
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// Artifact edit did not finish in time
    #[error("Artifact operation timed out after {0} seconds")]
    Timeout(u64),
}

impl MutationError {
    /// Whether the error was raised by input validation, i.e. before any write.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::InvalidPageIndex { .. }
        )
    }
}

impl From<lopdf::Error> for MutationError {
    fn from(err: lopdf::Error) -> Self {
        MutationError::ArtifactIo(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(MutationError::InvalidArgument("x".into()).is_validation());
        assert!(MutationError::InvalidPageIndex { number: 4, page_count: 3 }.is_validation());
        assert!(!MutationError::ArtifactIo("disk full".into()).is_validation());
        assert!(!MutationError::Timeout(5).is_validation());
    }

    #[test]
    fn test_page_index_message() {
        let err = MutationError::InvalidPageIndex { number: 7, page_count: 5 };
        assert_eq!(err.to_string(), "Invalid page index: page 7 is outside 1..=5");
    }
}
