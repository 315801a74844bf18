//! Version and page entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::path::DocumentPath;

/// One page of a document version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: Uuid,
    /// 1-based position, unique within the version
    pub number: usize,
    /// Extracted text of this page
    pub text: String,
}

impl Page {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            text: text.into(),
        }
    }
}

/// Immutable numbered snapshot of a document's pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVersion {
    pub id: Uuid,
    pub document_id: Uuid,
    /// Version number, starting at 1
    pub number: u32,
    /// File name of the paginated artifact
    pub file_name: String,
    pub page_count: usize,
    /// Pages numbered 1..=page_count
    pub pages: Vec<Page>,
    /// Aggregated text of all pages
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl DocumentVersion {
    /// First version of a document with `page_count` pages and no text yet.
    pub fn new(document_id: Uuid, file_name: impl Into<String>, page_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            number: 1,
            file_name: file_name.into(),
            page_count,
            pages: (1..=page_count).map(|n| Page::new(n, "")).collect(),
            text: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Build a version from per-page texts (page `i + 1` gets `texts[i]`).
    pub fn with_page_texts<S: Into<String>>(
        document_id: Uuid,
        file_name: impl Into<String>,
        texts: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut version = Self::new(document_id, file_name, 0);
        version.update_text_field(texts.into_iter().map(Into::into).collect());
        version
    }

    /// Shell for the next version of the same document.
    ///
    /// Keeps the page count, drops all text. The shell gets a new artifact
    /// address so nothing written to it can clobber this version.
    pub fn bump(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: self.document_id,
            number: self.number + 1,
            file_name: self.file_name.clone(),
            page_count: self.page_count,
            pages: (1..=self.page_count).map(|n| Page::new(n, "")).collect(),
            text: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Address of this version's paginated artifact
    pub fn document_path(&self) -> DocumentPath {
        DocumentPath::new(self.document_id, self.number, self.file_name.clone())
    }

    /// Page by 1-based number
    pub fn page(&self, number: usize) -> Option<&Page> {
        self.pages.iter().find(|page| page.number == number)
    }

    pub fn page_numbers(&self) -> Vec<usize> {
        self.pages.iter().map(|page| page.number).collect()
    }

    /// Replace page texts with `streams` (in page order) and recompute the
    /// aggregated text.
    ///
    /// The page list is resized to `streams.len()`; existing page ids are
    /// kept positionally and pages are renumbered 1..=n. Page texts are
    /// stored as given; only the aggregated text is trimmed.
    pub fn update_text_field(&mut self, streams: Vec<String>) {
        let count = streams.len();
        self.pages.truncate(count);

        for (index, text) in streams.into_iter().enumerate() {
            match self.pages.get_mut(index) {
                Some(page) => {
                    page.number = index + 1;
                    page.text = text;
                }
                None => self.pages.push(Page::new(index + 1, text)),
            }
        }

        self.page_count = count;
        self.text = self
            .pages
            .iter()
            .map(|page| page.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
    }

    /// Set the page count to `count`, keeping existing pages and adding empty
    /// ones. Used when only the binary artifact is rebuilt.
    pub fn resize_pages(&mut self, count: usize) {
        self.pages.truncate(count);
        for number in self.pages.len() + 1..=count {
            self.pages.push(Page::new(number, ""));
        }
        self.page_count = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_version_numbers_pages_contiguously() {
        let version = DocumentVersion::new(Uuid::new_v4(), "scan.pdf", 3);
        assert_eq!(version.number, 1);
        assert_eq!(version.page_numbers(), vec![1, 2, 3]);
        assert!(version.text.is_empty());
    }

    #[test]
    fn test_bump_keeps_count_and_drops_text() {
        let version =
            DocumentVersion::with_page_texts(Uuid::new_v4(), "scan.pdf", ["one", "two"]);
        let next = version.bump();

        assert_eq!(next.number, 2);
        assert_eq!(next.document_id, version.document_id);
        assert_eq!(next.page_count, 2);
        assert!(next.pages.iter().all(|p| p.text.is_empty()));
        assert_ne!(next.document_path(), version.document_path());
    }

    #[test]
    fn test_update_text_field_resizes_and_aggregates() {
        let mut version = DocumentVersion::new(Uuid::new_v4(), "scan.pdf", 4);
        let first_id = version.pages[0].id;

        version.update_text_field(vec!["  alpha ".into(), "".into(), "gamma\n".into()]);

        assert_eq!(version.page_count, 3);
        assert_eq!(version.page_numbers(), vec![1, 2, 3]);
        assert_eq!(version.pages[0].id, first_id);
        assert_eq!(version.page(3).unwrap().text, "gamma\n");
        assert_eq!(version.text, "alpha gamma");
    }

    #[test]
    fn test_update_text_field_keeps_page_text_verbatim() {
        let mut version = DocumentVersion::new(Uuid::new_v4(), "scan.pdf", 2);
        version.update_text_field(vec!["  line one\n".into(), "\tline two ".into()]);

        assert_eq!(version.page(1).unwrap().text, "  line one\n");
        assert_eq!(version.page(2).unwrap().text, "\tline two ");
        assert_eq!(version.text, "line one line two");
    }

    #[test]
    fn test_update_text_field_grows_page_list() {
        let mut version = DocumentVersion::new(Uuid::new_v4(), "scan.pdf", 0);
        version.update_text_field(vec!["a".into(), "b".into()]);

        assert_eq!(version.page_count, 2);
        assert_eq!(version.page(2).unwrap().text, "b");
    }

    #[test]
    fn test_resize_pages() {
        let mut version = DocumentVersion::with_page_texts(Uuid::new_v4(), "x.pdf", ["a", "b"]);
        version.resize_pages(4);
        assert_eq!(version.page_numbers(), vec![1, 2, 3, 4]);
        assert_eq!(version.page(1).unwrap().text, "a");

        version.resize_pages(1);
        assert_eq!(version.page_count, 1);
        assert_eq!(version.pages.len(), 1);
    }
}
