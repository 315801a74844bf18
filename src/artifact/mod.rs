//! Paginated binary artifacts
//!
//! A version's artifact (a PDF in production) is treated as an opaque
//! page-addressable container. Backends implement two traits:
//!
//! - [`ArtifactBackend`]: opens existing artifacts and creates empty ones
//! - [`PageArtifact`]: an opened artifact, edited in memory and then saved
//!
//! [`PageArtifactEditor`] builds the four structural edits (remove, insert,
//! reorder, rotate) on top of them.
//!
//! All methods are blocking. Async callers run them on the blocking pool.

mod editor;
mod memory;
mod pdf;

pub use editor::{PageArtifactEditor, PageRotation};
pub use memory::{MemoryArtifact, MemoryBackend, MemoryPage};
pub use pdf::{PdfArtifact, PdfBackend};

#[cfg(test)]
pub(crate) use pdf::fixtures as pdf_fixtures;

use std::path::Path;

use crate::error::{MutationError, Result};

/// An opened, editable artifact. Page numbers are 1-based.
pub trait PageArtifact: Send + Sized {
    fn page_count(&self) -> usize;

    /// Current orientation of a page in degrees
    fn page_rotation(&self, number: usize) -> Result<i32>;

    /// Remove page `number`; later pages shift down by one
    fn remove_page(&mut self, number: usize) -> Result<()>;

    /// Insert a copy of `source`'s page `number` before 0-based `index`
    fn insert_page(&mut self, index: usize, source: &Self, number: usize) -> Result<()>;

    /// Insert copies of `source`'s pages `numbers`, in order, before 0-based
    /// `index`. Backends that copy shared objects along with a page override
    /// this to copy them once per batch.
    fn insert_pages(&mut self, index: usize, source: &Self, numbers: &[usize]) -> Result<()> {
        for (offset, &number) in numbers.iter().enumerate() {
            self.insert_page(index + offset, source, number)?;
        }
        Ok(())
    }

    /// Append a copy of `source`'s page `number`
    fn append_page(&mut self, source: &Self, number: usize) -> Result<()> {
        self.insert_page(self.page_count(), source, number)
    }

    /// Rotate page `number` by `angle` degrees relative to its current orientation
    fn rotate_page(&mut self, number: usize, angle: i32) -> Result<()>;

    /// Persist the artifact at `path`, creating parent directories
    fn save(&mut self, path: &Path) -> Result<()>;
}

/// Factory for artifacts of one binary format
pub trait ArtifactBackend: Send + Sync + 'static {
    type Artifact: PageArtifact;

    /// Open the artifact stored at `path`
    fn open(&self, path: &Path) -> Result<Self::Artifact>;

    /// A new artifact without pages
    fn create(&self) -> Self::Artifact;
}

/// Check a 1-based page number against a page count.
pub(crate) fn check_page(number: usize, page_count: usize) -> Result<()> {
    if number == 0 || number > page_count {
        return Err(MutationError::InvalidPageIndex { number, page_count });
    }
    Ok(())
}

/// Normalize an angle in degrees to `0..360`.
pub(crate) fn normalize_angle(angle: i64) -> i32 {
    angle.rem_euclid(360) as i32
}
