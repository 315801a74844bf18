//! In-memory artifact backend
//!
//! Stores artifacts as labelled page lists keyed by path. Used in tests and
//! anywhere a real binary format is not needed.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{check_page, normalize_angle, ArtifactBackend, PageArtifact};
use crate::error::{MutationError, Result};

/// A page of an in-memory artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPage {
    /// Identifies where the page content came from
    pub label: String,
    /// Orientation in degrees, `0..360`
    pub rotation: i32,
}

impl MemoryPage {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rotation: 0,
        }
    }
}

type Files = Arc<RwLock<HashMap<PathBuf, Vec<MemoryPage>>>>;

/// Backend keeping saved artifacts in a shared map
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    files: Files,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an artifact directly
    pub fn put(&self, path: impl Into<PathBuf>, pages: Vec<MemoryPage>) {
        self.files.write().insert(path.into(), pages);
    }

    /// Store an artifact whose pages are labelled `labels`
    pub fn put_labels<S: Into<String>>(
        &self,
        path: impl Into<PathBuf>,
        labels: impl IntoIterator<Item = S>,
    ) {
        self.put(path, labels.into_iter().map(MemoryPage::new).collect());
    }

    /// Saved pages at `path`
    pub fn get(&self, path: &Path) -> Option<Vec<MemoryPage>> {
        self.files.read().get(path).cloned()
    }

    /// Page labels at `path`, in order
    pub fn labels(&self, path: &Path) -> Option<Vec<String>> {
        self.get(path)
            .map(|pages| pages.into_iter().map(|page| page.label).collect())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }
}

impl ArtifactBackend for MemoryBackend {
    type Artifact = MemoryArtifact;

    fn open(&self, path: &Path) -> Result<MemoryArtifact> {
        let pages = self.get(path).ok_or_else(|| {
            MutationError::ArtifactIo(format!("No artifact at {}", path.display()))
        })?;

        Ok(MemoryArtifact {
            pages,
            files: self.files.clone(),
        })
    }

    fn create(&self) -> MemoryArtifact {
        MemoryArtifact {
            pages: Vec::new(),
            files: self.files.clone(),
        }
    }
}

/// Opened in-memory artifact
#[derive(Debug, Clone)]
pub struct MemoryArtifact {
    pages: Vec<MemoryPage>,
    files: Files,
}

impl MemoryArtifact {
    pub fn pages(&self) -> &[MemoryPage] {
        &self.pages
    }
}

impl PageArtifact for MemoryArtifact {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_rotation(&self, number: usize) -> Result<i32> {
        check_page(number, self.pages.len())?;
        Ok(self.pages[number - 1].rotation)
    }

    fn remove_page(&mut self, number: usize) -> Result<()> {
        check_page(number, self.pages.len())?;
        self.pages.remove(number - 1);
        Ok(())
    }

    fn insert_page(&mut self, index: usize, source: &Self, number: usize) -> Result<()> {
        check_page(number, source.pages.len())?;
        if index > self.pages.len() {
            return Err(MutationError::InvalidPageIndex {
                number: index,
                page_count: self.pages.len(),
            });
        }
        self.pages.insert(index, source.pages[number - 1].clone());
        Ok(())
    }

    fn rotate_page(&mut self, number: usize, angle: i32) -> Result<()> {
        check_page(number, self.pages.len())?;
        let page = &mut self.pages[number - 1];
        page.rotation = normalize_angle(page.rotation as i64 + angle as i64);
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.files
            .write()
            .insert(path.to_path_buf(), self.pages.clone());
        Ok(())
    }
}
