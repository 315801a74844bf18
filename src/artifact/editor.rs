//! Structural edits of version artifacts
//!
//! Every edit opens the source artifact(s), edits in memory and saves once
//! at the destination address. Nothing is written when an edit fails.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use super::{ArtifactBackend, PageArtifact};
use crate::error::{MutationError, Result};
use crate::position::PageReorder;
use crate::storage::PageStorage;
use crate::version::DocumentPath;

/// Rotate page `number` by `angle` degrees, relative to its current orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRotation {
    pub number: usize,
    pub angle: i32,
}

impl PageRotation {
    pub fn new(number: usize, angle: i32) -> Self {
        Self { number, angle }
    }
}

/// Applies page edits to version artifacts through an [`ArtifactBackend`]
pub struct PageArtifactEditor<B> {
    backend: Arc<B>,
    storage: Arc<dyn PageStorage>,
}

impl<B> Clone for PageArtifactEditor<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            storage: self.storage.clone(),
        }
    }
}

impl<B: ArtifactBackend> PageArtifactEditor<B> {
    pub fn new(backend: Arc<B>, storage: Arc<dyn PageStorage>) -> Self {
        Self { backend, storage }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Filesystem path of a version's artifact
    pub fn artifact_path(&self, path: &DocumentPath) -> PathBuf {
        self.storage.abs_path(&path.url())
    }

    fn open(&self, path: &DocumentPath) -> Result<B::Artifact> {
        self.backend.open(&self.artifact_path(path))
    }

    /// Remove `page_numbers` (original numbering) from `source`, saving the
    /// result at `target`. Returns the new page count.
    pub fn remove(
        &self,
        source: &DocumentPath,
        target: &DocumentPath,
        page_numbers: &[usize],
    ) -> Result<usize> {
        let mut artifact = self.open(source)?;
        let page_count = artifact.page_count();

        let mut ordered = page_numbers.to_vec();
        ordered.sort_unstable();
        ordered.dedup();
        for &number in &ordered {
            super::check_page(number, page_count)?;
        }

        // each removal shifts the pages after it down by one
        for (removed, &number) in ordered.iter().enumerate() {
            artifact.remove_page(number - removed)?;
        }

        artifact.save(&self.artifact_path(target))?;
        tracing::debug!(
            source = %source,
            target = %target,
            removed = ordered.len(),
            "Removed pages from artifact"
        );
        Ok(artifact.page_count())
    }

    /// Insert `src_page_numbers` of `src_old`, in the given order, before
    /// 0-based `dst_position` of `dst_old` and save at `dst_new`.
    ///
    /// Without `dst_old` the destination starts empty and the position is 0.
    /// Returns the new page count.
    pub fn insert(
        &self,
        src_old: &DocumentPath,
        dst_old: Option<&DocumentPath>,
        dst_new: &DocumentPath,
        src_page_numbers: &[usize],
        dst_position: usize,
    ) -> Result<usize> {
        let source = self.open(src_old)?;
        let (mut destination, position) = match dst_old {
            Some(path) => (self.open(path)?, dst_position),
            None => (self.backend.create(), 0),
        };

        if position > destination.page_count() {
            return Err(MutationError::InvalidArgument(format!(
                "insert position {} is past the end of a {}-page destination",
                position,
                destination.page_count()
            )));
        }
        for &number in src_page_numbers {
            super::check_page(number, source.page_count())?;
        }

        destination.insert_pages(position, &source, src_page_numbers)?;

        destination.save(&self.artifact_path(dst_new))?;
        tracing::debug!(
            source = %src_old,
            target = %dst_new,
            inserted = src_page_numbers.len(),
            position,
            "Inserted pages into artifact"
        );
        Ok(destination.page_count())
    }

    /// Build a new artifact from `old`'s pages ordered by `new_number`.
    /// Returns the new page count.
    pub fn reorder(
        &self,
        old: &DocumentPath,
        new: &DocumentPath,
        pairs: &[PageReorder],
    ) -> Result<usize> {
        let source = self.open(old)?;

        let mut ordered = pairs.to_vec();
        ordered.sort_by_key(|item| item.new_number);
        let old_numbers: Vec<usize> = ordered.iter().map(|item| item.old_number).collect();

        let mut destination = self.backend.create();
        destination.insert_pages(0, &source, &old_numbers)?;

        destination.save(&self.artifact_path(new))?;
        tracing::debug!(source = %old, target = %new, pages = ordered.len(), "Reordered artifact");
        Ok(destination.page_count())
    }

    /// Apply relative rotations to a copy of `old` and save it at `new`.
    /// Returns the (unchanged) page count.
    pub fn rotate(
        &self,
        old: &DocumentPath,
        new: &DocumentPath,
        rotations: &[PageRotation],
    ) -> Result<usize> {
        let mut artifact = self.open(old)?;
        for rotation in rotations {
            super::check_page(rotation.number, artifact.page_count())?;
        }

        for rotation in rotations {
            artifact.rotate_page(rotation.number, rotation.angle)?;
        }

        artifact.save(&self.artifact_path(new))?;
        tracing::debug!(source = %old, target = %new, rotated = rotations.len(), "Rotated pages");
        Ok(artifact.page_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::MemoryBackend;
    use crate::storage::LocalPageStorage;
    use uuid::Uuid;

    fn editor() -> (PageArtifactEditor<MemoryBackend>, MemoryBackend) {
        let backend = MemoryBackend::new();
        let storage: Arc<dyn PageStorage> = Arc::new(LocalPageStorage::new("/media"));
        (PageArtifactEditor::new(Arc::new(backend.clone()), storage), backend)
    }

    fn path(version: u32) -> DocumentPath {
        DocumentPath::new(Uuid::nil(), version, "doc.pdf")
    }

    #[test]
    fn test_remove_applies_running_shift() {
        let (editor, backend) = editor();
        backend.put_labels(editor.artifact_path(&path(1)), ["p1", "p2", "p3", "p4", "p5"]);

        // unsorted input must still remove the original pages 2 and 4
        let count = editor.remove(&path(1), &path(2), &[4, 2]).unwrap();

        assert_eq!(count, 3);
        assert_eq!(
            backend.labels(&editor.artifact_path(&path(2))).unwrap(),
            vec!["p1", "p3", "p5"]
        );
    }

    #[test]
    fn test_remove_out_of_range_writes_nothing() {
        let (editor, backend) = editor();
        backend.put_labels(editor.artifact_path(&path(1)), ["p1", "p2"]);

        let result = editor.remove(&path(1), &path(2), &[1, 3]);

        assert!(matches!(result, Err(MutationError::InvalidPageIndex { number: 3, .. })));
        assert!(!backend.contains(&editor.artifact_path(&path(2))));
    }

    #[test]
    fn test_insert_into_existing_destination() {
        let (editor, backend) = editor();
        let src = DocumentPath::new(Uuid::new_v4(), 1, "src.pdf");
        backend.put_labels(editor.artifact_path(&src), ["s1", "s2", "s3"]);
        backend.put_labels(editor.artifact_path(&path(1)), ["d1", "d2"]);

        let count = editor
            .insert(&src, Some(&path(1)), &path(2), &[3, 1], 1)
            .unwrap();

        assert_eq!(count, 4);
        assert_eq!(
            backend.labels(&editor.artifact_path(&path(2))).unwrap(),
            vec!["d1", "s3", "s1", "d2"]
        );
    }

    #[test]
    fn test_insert_without_destination_forces_position_zero() {
        let (editor, backend) = editor();
        let src = DocumentPath::new(Uuid::new_v4(), 1, "src.pdf");
        backend.put_labels(editor.artifact_path(&src), ["s1", "s2"]);

        editor.insert(&src, None, &path(2), &[2, 1], 5).unwrap();

        assert_eq!(
            backend.labels(&editor.artifact_path(&path(2))).unwrap(),
            vec!["s2", "s1"]
        );
    }

    #[test]
    fn test_reorder_sorts_pairs() {
        let (editor, backend) = editor();
        backend.put_labels(editor.artifact_path(&path(1)), ["a", "b", "c"]);

        let pairs = [
            PageReorder::new(1, 3),
            PageReorder::new(3, 1),
            PageReorder::new(2, 2),
        ];
        editor.reorder(&path(1), &path(2), &pairs).unwrap();

        assert_eq!(
            backend.labels(&editor.artifact_path(&path(2))).unwrap(),
            vec!["c", "b", "a"]
        );
    }

    #[test]
    fn test_rotate_then_inverse() {
        let (editor, backend) = editor();
        backend.put_labels(editor.artifact_path(&path(1)), ["a", "b"]);

        editor
            .rotate(&path(1), &path(2), &[PageRotation::new(2, 90)])
            .unwrap();
        editor
            .rotate(&path(2), &path(3), &[PageRotation::new(2, -90)])
            .unwrap();

        let rotated = backend.get(&editor.artifact_path(&path(2))).unwrap();
        assert_eq!(rotated[1].rotation, 90);
        let restored = backend.get(&editor.artifact_path(&path(3))).unwrap();
        assert!(restored.iter().all(|page| page.rotation == 0));
    }

    #[test]
    fn test_missing_source_is_artifact_error() {
        let (editor, _backend) = editor();
        let result = editor.rotate(&path(1), &path(2), &[]);
        assert!(matches!(result, Err(MutationError::ArtifactIo(_))));
    }
}
