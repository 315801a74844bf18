//! Operation arguments

use std::collections::HashMap;
use uuid::Uuid;

use crate::artifact::PageRotation;
use crate::error::{MutationError, Result};
use crate::version::DocumentVersion;

/// Where merged pages go
///
/// `old` is the destination's current version, or `None` when the
/// destination document has no pages yet. `new` is the fresh version that
/// receives the result. `position` is the 0-based index the pages are
/// inserted before; it is ignored without `old`.
#[derive(Debug)]
pub struct Destination<'a> {
    pub old: Option<&'a DocumentVersion>,
    pub new: &'a mut DocumentVersion,
    pub position: usize,
}

impl<'a> Destination<'a> {
    /// Destination without previous content
    pub fn fresh(new: &'a mut DocumentVersion) -> Self {
        Self {
            old: None,
            new,
            position: 0,
        }
    }

    /// Insert before `position` of `old`, writing into `new`
    pub fn existing(old: &'a DocumentVersion, new: &'a mut DocumentVersion, position: usize) -> Self {
        Self {
            old: Some(old),
            new,
            position,
        }
    }

    /// Page count of the destination before the merge
    pub fn prior_page_count(&self) -> Option<usize> {
        self.old.map(|version| version.page_count)
    }
}

/// Resolve `(page id, angle)` pairs to page numbers of `version`.
pub fn annotate_rotations(
    version: &DocumentVersion,
    rotations: &[(Uuid, i32)],
) -> Result<Vec<PageRotation>> {
    let numbers: HashMap<Uuid, usize> = version
        .pages
        .iter()
        .map(|page| (page.id, page.number))
        .collect();

    rotations
        .iter()
        .map(|&(page_id, angle)| {
            numbers
                .get(&page_id)
                .map(|&number| PageRotation::new(number, angle))
                .ok_or_else(|| {
                    MutationError::InvalidArgument(format!(
                        "page {} does not belong to version {} of document {}",
                        page_id, version.number, version.document_id
                    ))
                })
        })
        .collect()
}
