//! Pagewright
//!
//! Page mutation engine for versioned multi-page documents. Every mutation
//! reads an existing version and writes a new one, carrying per-page side
//! data along with the pages it belongs to.
//!
//! # Modules
//!
//! - `position`: which old page feeds which new page
//! - `artifact`: structural edits of the paginated binary (PDF via lopdf)
//! - `replicator`: recognition artifacts and page text follow the position map
//! - `operations`: delete, insert, total and partial merge, reorder, rotate
//! - `storage`, `lifecycle`: injected collaborators
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use pagewright::{
//!     DocumentLifecycle, DocumentVersion, EngineConfig, PageMutationEngine, PdfBackend,
//! };
//!
//! struct NoopLifecycle;
//!
//! #[async_trait]
//! impl DocumentLifecycle for NoopLifecycle {
//!     async fn delete_document(&self, _id: uuid::Uuid) -> Result<(), String> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn run(old: DocumentVersion) -> pagewright::Result<()> {
//! let config = EngineConfig::from_env().unwrap_or_default();
//! let engine = PageMutationEngine::with_local_storage(PdfBackend::new(), Arc::new(NoopLifecycle), &config);
//!
//! let mut new = old.bump();
//! engine.delete_pages(&old, &mut new, &[2, 3]).await?;
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod operations;
pub mod position;
pub mod replicator;
pub mod storage;
pub mod telemetry;
pub mod version;

pub use artifact::{ArtifactBackend, PageArtifact, PageArtifactEditor, PageRotation, PdfBackend};
pub use config::EngineConfig;
pub use error::{MutationError, Result};
pub use lifecycle::DocumentLifecycle;
pub use operations::{annotate_rotations, Destination, PageMutationEngine};
pub use position::{MergePlan, PageRecycleItem, PageReorder, PositionMap};
pub use replicator::SideDataReplicator;
pub use storage::{LocalPageStorage, PageStorage, StorageError};
pub use version::{DocumentPath, DocumentVersion, Page, PagePath};
