//! PDF artifact backend (lopdf)
//!
//! On open, the page tree is flattened: inheritable attributes (`Resources`,
//! `MediaBox`, `CropBox`, `Rotate`) are copied onto each page and every page
//! is re-parented to the root `Pages` node. Page edits then reduce to edits of
//! one `Kids` vector, which is written back on save. Objects that become
//! unreachable are pruned before writing.
//!
//! Pages inserted from another document are deep-copied together with every
//! object they reference.

use std::collections::HashMap;
use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

use super::{check_page, normalize_angle, ArtifactBackend, PageArtifact};
use crate::error::{MutationError, Result};

const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against cyclic `Parent` chains in malformed files
const MAX_TREE_DEPTH: usize = 64;

// ============================================================================
// Backend
// ============================================================================

/// Backend reading and writing PDF files
#[derive(Debug, Clone, Default)]
pub struct PdfBackend;

impl PdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactBackend for PdfBackend {
    type Artifact = PdfArtifact;

    fn open(&self, path: &Path) -> Result<PdfArtifact> {
        let doc = Document::load(path).map_err(|e| {
            MutationError::ArtifactIo(format!("Failed to open {}: {}", path.display(), e))
        })?;
        PdfArtifact::from_document(doc)
    }

    fn create(&self) -> PdfArtifact {
        PdfArtifact::empty()
    }
}

// ============================================================================
// Artifact
// ============================================================================

/// An opened PDF with a flat page list
pub struct PdfArtifact {
    doc: Document,
    /// Root `Pages` node
    pages_id: ObjectId,
    /// Page objects in page order
    kids: Vec<ObjectId>,
}

impl PdfArtifact {
    /// New PDF without pages
    pub fn empty() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => Object::Integer(0),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    fn from_document(mut doc: Document) -> Result<Self> {
        let root_id = doc.trailer.get(b"Root")?.as_reference()?;
        let pages_id = doc.get_dictionary(root_id)?.get(b"Pages")?.as_reference()?;
        let kids: Vec<ObjectId> = doc.get_pages().into_values().collect();

        for &page_id in &kids {
            let inherited: Vec<(&[u8], Object)> = {
                let page = doc.get_dictionary(page_id)?;
                INHERITABLE_KEYS
                    .iter()
                    .filter(|key| !page.has(key))
                    .filter_map(|key| {
                        inherited_attribute(&doc, page, key).map(|value| (*key, value))
                    })
                    .collect()
            };

            let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
            for (key, value) in inherited {
                page.set(key, value);
            }
            page.set("Parent", pages_id);
        }

        Ok(Self {
            doc,
            pages_id,
            kids,
        })
    }

    /// Decoded content stream of page `number`
    pub fn page_content(&self, number: usize) -> Result<Vec<u8>> {
        check_page(number, self.kids.len())?;
        Ok(self.doc.get_page_content(self.kids[number - 1])?)
    }

    fn page_dict_mut(&mut self, number: usize) -> Result<&mut Dictionary> {
        check_page(number, self.kids.len())?;
        Ok(self.doc.get_object_mut(self.kids[number - 1])?.as_dict_mut()?)
    }

    fn sync_page_tree(&mut self) -> Result<()> {
        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        let count = kids.len() as i64;
        let pages = self.doc.get_object_mut(self.pages_id)?.as_dict_mut()?;
        pages.set("Kids", kids);
        pages.set("Count", Object::Integer(count));
        Ok(())
    }

    fn import_object(
        &mut self,
        source: &Document,
        id: ObjectId,
        mapping: &mut HashMap<ObjectId, ObjectId>,
    ) -> ObjectId {
        if let Some(&mapped) = mapping.get(&id) {
            return mapped;
        }

        let new_id = self.doc.new_object_id();
        mapping.insert(id, new_id);

        // PDF readers treat dangling references as null
        let object = source.get_object(id).cloned().unwrap_or(Object::Null);
        let object = self.import_value(source, object, mapping);
        self.doc.objects.insert(new_id, object);
        new_id
    }

    fn import_value(
        &mut self,
        source: &Document,
        object: Object,
        mapping: &mut HashMap<ObjectId, ObjectId>,
    ) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(self.import_object(source, id, mapping)),
            Object::Array(items) => Object::Array(
                items
                    .into_iter()
                    .map(|item| self.import_value(source, item, mapping))
                    .collect(),
            ),
            Object::Dictionary(dict) => {
                Object::Dictionary(self.import_dictionary(source, dict, mapping))
            }
            Object::Stream(mut stream) => {
                let dict = std::mem::take(&mut stream.dict);
                stream.dict = self.import_dictionary(source, dict, mapping);
                Object::Stream(stream)
            }
            other => other,
        }
    }

    fn import_dictionary(
        &mut self,
        source: &Document,
        dict: Dictionary,
        mapping: &mut HashMap<ObjectId, ObjectId>,
    ) -> Dictionary {
        let mut imported = Dictionary::new();
        for (key, value) in dict.iter() {
            let value = self.import_value(source, value.clone(), mapping);
            imported.set(key.clone(), value);
        }
        imported
    }
}

// ============================================================================
// Page Tree Helpers
// ============================================================================

/// Walk up the `Parent` chain of `page` looking for `key`.
fn inherited_attribute(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut current = page;
    for _ in 0..MAX_TREE_DEPTH {
        let parent_id = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent_id).ok()?;
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
    }
    None
}

// ============================================================================
// Page Edits
// ============================================================================

impl PageArtifact for PdfArtifact {
    fn page_count(&self) -> usize {
        self.kids.len()
    }

    fn page_rotation(&self, number: usize) -> Result<i32> {
        check_page(number, self.kids.len())?;
        let page = self.doc.get_dictionary(self.kids[number - 1])?;
        let rotation = page.get(b"Rotate").and_then(Object::as_i64).unwrap_or(0);
        Ok(normalize_angle(rotation))
    }

    fn remove_page(&mut self, number: usize) -> Result<()> {
        check_page(number, self.kids.len())?;
        self.kids.remove(number - 1);
        Ok(())
    }

    fn insert_page(&mut self, index: usize, source: &Self, number: usize) -> Result<()> {
        self.insert_pages(index, source, &[number])
    }

    fn insert_pages(&mut self, index: usize, source: &Self, numbers: &[usize]) -> Result<()> {
        for &number in numbers {
            check_page(number, source.kids.len())?;
        }
        if index > self.kids.len() {
            return Err(MutationError::InvalidPageIndex {
                number: index,
                page_count: self.kids.len(),
            });
        }

        // one mapping per batch so fonts, images and resource dictionaries
        // shared by the source pages are copied once; copied pages hang off
        // our own page tree, not the source's
        let mut mapping = HashMap::from([(source.pages_id, self.pages_id)]);
        for (offset, &number) in numbers.iter().enumerate() {
            let source_page = source.kids[number - 1];
            // a page selected twice still gets its own page object
            mapping.remove(&source_page);
            let page_id = self.import_object(&source.doc, source_page, &mut mapping);
            self.kids.insert(index + offset, page_id);
        }
        Ok(())
    }

    fn rotate_page(&mut self, number: usize, angle: i32) -> Result<()> {
        let page = self.page_dict_mut(number)?;
        let current = page.get(b"Rotate").and_then(Object::as_i64).unwrap_or(0);
        let rotation = normalize_angle(current + angle as i64);
        page.set("Rotate", Object::Integer(rotation as i64));
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.sync_page_tree()?;
        self.doc.prune_objects();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MutationError::ArtifactIo(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        self.doc.save(path).map_err(|e| {
            MutationError::ArtifactIo(format!("Failed to save {}: {}", path.display(), e))
        })?;
        Ok(())
    }
}

// ============================================================================
// Test Fixtures
// ============================================================================
