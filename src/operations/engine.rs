//! Page mutation engine
//!
//! Each operation validates its input, edits the binary artifact on the
//! blocking pool, then replicates side data into the new version. The new
//! version is a fresh shell created by the caller (see
//! [`DocumentVersion::bump`]); old versions are never written.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;

use super::request::Destination;
use crate::artifact::{ArtifactBackend, PageArtifactEditor, PageRotation};
use crate::config::EngineConfig;
use crate::error::{MutationError, Result};
use crate::lifecycle::DocumentLifecycle;
use crate::position::{reordered_list, validate_selection, MergePlan, PageReorder, PositionMap};
use crate::replicator::SideDataReplicator;
use crate::storage::{LocalPageStorage, PageStorage};
use crate::version::DocumentVersion;

/// Concurrency slot of one operation, shared with the blocking edits it
/// starts. The slot frees when the last share is dropped.
type OperationPermit = Arc<OwnedSemaphorePermit>;

// ============================================================================
// Engine
// ============================================================================

/// Runs page mutations against injected collaborators
pub struct PageMutationEngine<B: ArtifactBackend> {
    editor: PageArtifactEditor<B>,
    replicator: SideDataReplicator,
    lifecycle: Arc<dyn DocumentLifecycle>,
    permits: Arc<Semaphore>,
    artifact_timeout: Duration,
}

impl<B: ArtifactBackend> PageMutationEngine<B> {
    pub fn new(
        backend: B,
        storage: Arc<dyn PageStorage>,
        lifecycle: Arc<dyn DocumentLifecycle>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            editor: PageArtifactEditor::new(Arc::new(backend), storage.clone()),
            replicator: SideDataReplicator::new(storage),
            lifecycle,
            permits: Arc::new(Semaphore::new(config.max_concurrent_operations.max(1))),
            artifact_timeout: Duration::from_secs(config.artifact_timeout_secs),
        }
    }

    /// Engine storing page artifacts under `config.media_root`
    pub fn with_local_storage(
        backend: B,
        lifecycle: Arc<dyn DocumentLifecycle>,
        config: &EngineConfig,
    ) -> Self {
        let storage = Arc::new(LocalPageStorage::new(config.media_root.clone()));
        Self::new(backend, storage, lifecycle, config)
    }

    pub fn editor(&self) -> &PageArtifactEditor<B> {
        &self.editor
    }

    /// Remove `page_numbers` from `old`, producing `new`.
    pub async fn delete_pages(
        &self,
        old: &DocumentVersion,
        new: &mut DocumentVersion,
        page_numbers: &[usize],
    ) -> Result<()> {
        let permit = self.acquire().await?;
        self.remove_pages(&permit, old, new, page_numbers).await?;

        tracing::info!(
            document_id = %old.document_id,
            from = old.number,
            to = new.number,
            deleted = page_numbers.len(),
            pages = new.page_count,
            "Deleted pages"
        );
        Ok(())
    }

    /// Insert `page_numbers` of `source`, in the given order, into `destination`.
    ///
    /// The source version is left untouched.
    pub async fn insert_pages(
        &self,
        source: &DocumentVersion,
        destination: Destination<'_>,
        page_numbers: &[usize],
    ) -> Result<()> {
        let permit = self.acquire().await?;
        self.merge_into(&permit, source, destination, page_numbers).await
    }

    /// Move every page of `source` into `destination` and delete the source
    /// document.
    pub async fn total_merge(
        &self,
        source: &DocumentVersion,
        destination: Destination<'_>,
    ) -> Result<()> {
        if source.page_count == 0 {
            return Err(MutationError::InvalidArgument(
                "source version has no pages to merge".to_string(),
            ));
        }
        ensure_other_document(source, destination.new)?;

        let permit = self.acquire().await?;
        let page_numbers: Vec<usize> = (1..=source.page_count).collect();
        let destination_id = destination.new.document_id;
        self.merge_into(&permit, source, destination, &page_numbers).await?;

        self.lifecycle
            .delete_document(source.document_id)
            .await
            .map_err(MutationError::Lifecycle)?;

        tracing::info!(
            source_document_id = %source.document_id,
            document_id = %destination_id,
            pages = page_numbers.len(),
            "Merged document and deleted source"
        );
        Ok(())
    }

    /// Move `page_numbers` of `source_old` into `destination`; `source_new`
    /// receives what is left of the source.
    pub async fn partial_merge(
        &self,
        source_old: &DocumentVersion,
        source_new: &mut DocumentVersion,
        destination: Destination<'_>,
        page_numbers: &[usize],
    ) -> Result<()> {
        if page_numbers.len() >= source_old.page_count {
            return Err(MutationError::InvalidArgument(format!(
                "moving {} of {} pages would consume all pages, use total merge instead",
                page_numbers.len(),
                source_old.page_count
            )));
        }
        validate_selection(page_numbers, source_old.page_count)?;
        ensure_other_document(source_old, destination.new)?;
        ensure_fresh_target(source_old, source_new)?;

        let permit = self.acquire().await?;
        let destination_id = destination.new.document_id;
        self.merge_into(&permit, source_old, destination, page_numbers).await?;
        self.remove_pages(&permit, source_old, source_new, page_numbers).await?;

        tracing::info!(
            source_document_id = %source_old.document_id,
            document_id = %destination_id,
            moved = page_numbers.len(),
            remaining = source_new.page_count,
            "Moved pages between documents"
        );
        Ok(())
    }

    /// Rearrange the pages of `old` into `new`.
    ///
    /// `pages_data` may list only the moved pages. Page text and recognition
    /// artifacts are not carried over; the new version needs recognition.
    pub async fn reorder(
        &self,
        old: &DocumentVersion,
        new: &mut DocumentVersion,
        pages_data: &[PageReorder],
    ) -> Result<()> {
        let order = reordered_list(pages_data, old.page_count)?;
        ensure_fresh_target(old, new)?;

        let permit = self.acquire().await?;
        let pairs: Vec<PageReorder> = order
            .iter()
            .enumerate()
            .map(|(index, &old_number)| PageReorder::new(old_number, index + 1))
            .collect();
        let (source, target) = (old.document_path(), new.document_path());
        let page_count = self
            .run_blocking(&permit, move |editor| editor.reorder(&source, &target, &pairs))
            .await?;
        check_page_count(page_count, old.page_count)?;
        new.resize_pages(page_count);

        tracing::info!(
            document_id = %old.document_id,
            from = old.number,
            to = new.number,
            pages = page_count,
            "Reordered pages"
        );
        Ok(())
    }

    /// Rotate pages of `old` into `new`. Angles are relative and must be
    /// multiples of 90. Page text is carried over unchanged.
    pub async fn rotate(
        &self,
        old: &DocumentVersion,
        new: &mut DocumentVersion,
        rotations: &[PageRotation],
    ) -> Result<()> {
        validate_rotations(rotations, old.page_count)?;
        ensure_fresh_target(old, new)?;

        let permit = self.acquire().await?;
        let (source, target) = (old.document_path(), new.document_path());
        let requested = rotations.to_vec();
        let page_count = self
            .run_blocking(&permit, move |editor| editor.rotate(&source, &target, &requested))
            .await?;
        check_page_count(page_count, old.page_count)?;

        // recognition artifacts describe unrotated geometry, only text is reused
        SideDataReplicator::reuse_text_field(old, new, &PositionMap::identity(old.page_count))?;

        tracing::info!(
            document_id = %old.document_id,
            from = old.number,
            to = new.number,
            rotated = rotations.len(),
            "Rotated pages"
        );
        Ok(())
    }

    async fn remove_pages(
        &self,
        permit: &OperationPermit,
        old: &DocumentVersion,
        new: &mut DocumentVersion,
        page_numbers: &[usize],
    ) -> Result<()> {
        let map = PositionMap::after_deletion(old.page_count, page_numbers)?;
        validate_selection(page_numbers, old.page_count)?;
        ensure_fresh_target(old, new)?;

        let (source, target) = (old.document_path(), new.document_path());
        let numbers = page_numbers.to_vec();
        let page_count = self
            .run_blocking(permit, move |editor| editor.remove(&source, &target, &numbers))
            .await?;
        check_page_count(page_count, map.len())?;

        self.replicator.replicate(old, new, &map).await
    }

    async fn merge_into(
        &self,
        permit: &OperationPermit,
        source: &DocumentVersion,
        destination: Destination<'_>,
        page_numbers: &[usize],
    ) -> Result<()> {
        validate_selection(page_numbers, source.page_count)?;
        let plan = MergePlan::new(
            destination.position,
            page_numbers,
            destination.prior_page_count(),
        )?;
        ensure_fresh_target(source, destination.new)?;
        if let Some(old) = destination.old {
            ensure_fresh_target(old, destination.new)?;
        }

        let document_id = destination.new.document_id;
        let src_path = source.document_path();
        let dst_old_path = destination.old.map(DocumentVersion::document_path);
        let dst_new_path = destination.new.document_path();
        let numbers = page_numbers.to_vec();
        let position = plan.position();
        let page_count = self
            .run_blocking(permit, move |editor| {
                editor.insert(
                    &src_path,
                    dst_old_path.as_ref(),
                    &dst_new_path,
                    &numbers,
                    position,
                )
            })
            .await?;
        check_page_count(page_count, plan.total())?;

        self.replicator
            .replicate_merge(source, destination.old, destination.new, &plan)
            .await?;

        tracing::debug!(
            source_document_id = %source.document_id,
            document_id = %document_id,
            position,
            inserted = page_numbers.len(),
            pages = plan.total(),
            "Inserted pages"
        );
        Ok(())
    }

    async fn acquire(&self) -> Result<OperationPermit> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map(Arc::new)
            .map_err(|e| MutationError::ArtifactIo(format!("Engine unavailable: {}", e)))
    }

    /// Run an artifact edit on the blocking pool, bounded by the artifact timeout.
    ///
    /// The edit keeps a share of `permit` until it finishes. A timed-out edit
    /// is not cancelled: it keeps its slot and may still write its
    /// destination after `Timeout` is returned, so callers must not reuse a
    /// timed-out destination address until the slot is free again.
    async fn run_blocking<T, F>(&self, permit: &OperationPermit, task: F) -> Result<T>
    where
        F: FnOnce(&PageArtifactEditor<B>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let editor = self.editor.clone();
        let held = permit.clone();
        let result = timeout(
            self.artifact_timeout,
            tokio::task::spawn_blocking(move || {
                let output = task(&editor);
                drop(held);
                output
            }),
        )
        .await;

        match result {
            Ok(join_result) => join_result
                .map_err(|e| MutationError::ArtifactIo(format!("Task join error: {}", e)))?,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.artifact_timeout.as_secs(),
                    "Artifact edit timed out, its slot stays taken until it finishes"
                );
                Err(MutationError::Timeout(self.artifact_timeout.as_secs()))
            }
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// The new version must not share an artifact address with the old one.
fn ensure_fresh_target(old: &DocumentVersion, new: &DocumentVersion) -> Result<()> {
    if old.document_path() == new.document_path() {
        return Err(MutationError::InvalidArgument(format!(
            "target {} is the address of an existing version",
            new.document_path()
        )));
    }
    Ok(())
}

fn ensure_other_document(source: &DocumentVersion, destination: &DocumentVersion) -> Result<()> {
    if source.document_id == destination.document_id {
        return Err(MutationError::InvalidArgument(format!(
            "cannot merge document {} into itself",
            source.document_id
        )));
    }
    Ok(())
}

fn validate_rotations(rotations: &[PageRotation], page_count: usize) -> Result<()> {
    if rotations.is_empty() {
        return Err(MutationError::InvalidArgument(
            "no pages to rotate".to_string(),
        ));
    }
    for rotation in rotations {
        if rotation.number == 0 || rotation.number > page_count {
            return Err(MutationError::InvalidPageIndex {
                number: rotation.number,
                page_count,
            });
        }
        if rotation.angle % 90 != 0 {
            return Err(MutationError::InvalidArgument(format!(
                "rotation of page {} by {} degrees is not a multiple of 90",
                rotation.number, rotation.angle
            )));
        }
    }
    Ok(())
}

/// The edited artifact must agree with the page count the version expects.
fn check_page_count(actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(MutationError::ArtifactIo(format!(
            "artifact has {} pages, expected {}",
            actual, expected
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
