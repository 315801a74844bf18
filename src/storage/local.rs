//! Local filesystem page storage
//!
//! Each page's recognition artifacts live in one directory:
//!
//! ```text
//! {media_root}/ocr/{document_id}/v{version}/pages/page_{n}/
//!     page.txt
//!     page.hocr
//!     page.jpg
//! ```

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

use super::types::{PageStorage, StorageError};
use crate::version::PagePath;

/// Local filesystem storage rooted at a media directory
#[derive(Debug, Clone)]
pub struct LocalPageStorage {
    media_root: PathBuf,
}

impl LocalPageStorage {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    fn copy_error(src: &PagePath, dst: &PagePath, err: io::Error) -> StorageError {
        if err.kind() == io::ErrorKind::PermissionDenied {
            return StorageError::AccessDenied(format!("{} -> {}: {}", src.url(), dst.url(), err));
        }
        StorageError::CopyFailed {
            src: src.url(),
            dst: dst.url(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl PageStorage for LocalPageStorage {
    async fn copy_page(&self, src: &PagePath, dst: &PagePath) -> Result<(), StorageError> {
        let src_dir = self.abs_path(&src.url());
        let dst_dir = self.abs_path(&dst.url());

        // Pages that were never recognized have nothing to carry over
        if !tokio::fs::try_exists(&src_dir)
            .await
            .map_err(|e| Self::copy_error(src, dst, e))?
        {
            tracing::warn!(src = %src, "No recognition artifacts for page, nothing to copy");
            return Ok(());
        }

        tokio::fs::create_dir_all(&dst_dir)
            .await
            .map_err(|e| Self::copy_error(src, dst, e))?;

        let mut entries = tokio::fs::read_dir(&src_dir)
            .await
            .map_err(|e| Self::copy_error(src, dst, e))?;

        let mut copied = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Self::copy_error(src, dst, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| Self::copy_error(src, dst, e))?;
            if !file_type.is_file() {
                continue;
            }

            tokio::fs::copy(entry.path(), dst_dir.join(entry.file_name()))
                .await
                .map_err(|e| Self::copy_error(src, dst, e))?;
            copied += 1;
        }

        tracing::debug!(src = %src, dst = %dst, files = copied, "Copied page artifacts");
        Ok(())
    }

    fn abs_path(&self, logical_path: &str) -> PathBuf {
        self.media_root.join(logical_path)
    }
}
