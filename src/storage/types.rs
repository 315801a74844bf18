//! Storage collaborator interface

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::version::PagePath;

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to copy {src} to {dst}: {reason}")]
    CopyFailed {
        src: String,
        dst: String,
        reason: String,
    },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Storage backend for per-page recognition artifacts
#[async_trait]
pub trait PageStorage: Send + Sync {
    /// Copy every artifact of page `src` to page `dst`
    async fn copy_page(&self, src: &PagePath, dst: &PagePath) -> Result<(), StorageError>;

    /// Resolve a logical path to a filesystem path
    fn abs_path(&self, logical_path: &str) -> PathBuf;
}
