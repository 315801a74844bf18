//! Logical storage addresses
//!
//! Paths are relative to the storage root; the storage collaborator turns them
//! into filesystem paths with `abs_path`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Address of a version's paginated artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPath {
    pub document_id: Uuid,
    pub version: u32,
    pub file_name: String,
}

impl DocumentPath {
    pub fn new(document_id: Uuid, version: u32, file_name: impl Into<String>) -> Self {
        Self {
            document_id,
            version,
            file_name: file_name.into(),
        }
    }

    /// `docs/{document_id}/v{version}/{file_name}`
    pub fn url(&self) -> String {
        format!(
            "docs/{}/v{}/{}",
            self.document_id, self.version, self.file_name
        )
    }

    /// Recognition artifact address of one page of this version
    pub fn page(&self, page_num: usize) -> PagePath {
        PagePath {
            document_path: self.clone(),
            page_num,
        }
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Address of one page's recognition artifact (keyed by document, version, page)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePath {
    pub document_path: DocumentPath,
    /// 1-based page number
    pub page_num: usize,
}

impl PagePath {
    /// `ocr/{document_id}/v{version}/pages/page_{page_num}`
    pub fn url(&self) -> String {
        format!(
            "ocr/{}/v{}/pages/page_{}",
            self.document_path.document_id, self.document_path.version, self.page_num
        )
    }
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_and_page_urls() {
        let id = Uuid::nil();
        let path = DocumentPath::new(id, 3, "scan.pdf");

        assert_eq!(
            path.url(),
            "docs/00000000-0000-0000-0000-000000000000/v3/scan.pdf"
        );
        assert_eq!(
            path.page(12).url(),
            "ocr/00000000-0000-0000-0000-000000000000/v3/pages/page_12"
        );
    }

    #[test]
    fn test_versions_do_not_share_page_addresses() {
        let id = Uuid::new_v4();
        let v1 = DocumentPath::new(id, 1, "a.pdf").page(1);
        let v2 = DocumentPath::new(id, 2, "a.pdf").page(1);
        assert_ne!(v1.url(), v2.url());
    }
}
