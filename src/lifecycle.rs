//! Document lifecycle collaborator
//!
//! Total merge consumes its source document. Removing a document (and
//! everything that hangs off it) is owned by the surrounding system, so the
//! engine only asks for it through this trait.

use async_trait::async_trait;
use uuid::Uuid;

/// Deletes whole documents on behalf of the engine
#[async_trait]
pub trait DocumentLifecycle: Send + Sync {
    /// Delete the document and all of its versions.
    ///
    /// The error string is surfaced as [`MutationError::Lifecycle`](crate::MutationError::Lifecycle).
    async fn delete_document(&self, document_id: Uuid) -> Result<(), String>;
}
