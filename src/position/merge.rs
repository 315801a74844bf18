//! Insertion arithmetic for merges
//!
//! Inserting `k` source pages before 0-based `position` of a destination with
//! `d` pages produces a destination of `d + k` pages in three ranges:
//!
//! ```text
//! new 1..=position              <- destination 1..=position          (leading)
//! new position+1..=position+k   <- source page_numbers[0..k]         (inserted)
//! new position+k+1..=d+k        <- destination position+1..=d        (trailing)
//! ```
//!
//! Each range is computed by its own function so the boundaries can be
//! checked independently.

use serde::Serialize;

use super::recycle::PageRecycleItem;
use crate::error::{MutationError, Result};

/// Destination pages kept in place: `(i, i)` for `i` in `1..=position`.
pub fn leading_pairs(position: usize) -> Vec<PageRecycleItem> {
    (1..=position).map(|n| PageRecycleItem::new(n, n)).collect()
}

/// Source pages inserted as a block right after `position`.
pub fn inserted_pairs(position: usize, page_numbers: &[usize]) -> Vec<PageRecycleItem> {
    page_numbers
        .iter()
        .enumerate()
        .map(|(offset, &old)| PageRecycleItem::new(position + 1 + offset, old))
        .collect()
}

/// Destination pages after the insertion point, shifted by `inserted`.
pub fn trailing_pairs(
    position: usize,
    inserted: usize,
    destination_total: usize,
) -> Vec<PageRecycleItem> {
    (position + 1..=destination_total)
        .map(|old| PageRecycleItem::new(old + inserted, old))
        .collect()
}

/// Which old version a segment reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentSource {
    /// The destination's previous version
    Destination,
    /// The version pages are taken from
    Source,
}

/// One replication pass of a merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSegment {
    pub source: SegmentSource,
    pub pairs: Vec<PageRecycleItem>,
}

/// Complete replication plan for inserting pages into a destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergePlan {
    position: usize,
    leading: MergeSegment,
    inserted: MergeSegment,
    trailing: MergeSegment,
}

impl MergePlan {
    /// Plan insertion of `page_numbers` before `position`.
    ///
    /// `destination_total` is the page count of the destination's previous
    /// version, or `None` when the destination starts empty (the position is
    /// then forced to 0).
    pub fn new(
        position: usize,
        page_numbers: &[usize],
        destination_total: Option<usize>,
    ) -> Result<Self> {
        let (position, destination_total) = match destination_total {
            Some(total) => {
                if position > total {
                    return Err(MutationError::InvalidArgument(format!(
                        "insert position {} is past the end of a {}-page destination",
                        position, total
                    )));
                }
                (position, total)
            }
            None => (0, 0),
        };

        Ok(Self {
            position,
            leading: MergeSegment {
                source: SegmentSource::Destination,
                pairs: leading_pairs(position),
            },
            inserted: MergeSegment {
                source: SegmentSource::Source,
                pairs: inserted_pairs(position, page_numbers),
            },
            trailing: MergeSegment {
                source: SegmentSource::Destination,
                pairs: trailing_pairs(position, page_numbers.len(), destination_total),
            },
        })
    }

    /// Effective 0-based insertion position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Segments in destination page order
    pub fn segments(&self) -> [&MergeSegment; 3] {
        [&self.leading, &self.inserted, &self.trailing]
    }

    /// Page count of the resulting destination
    pub fn total(&self) -> usize {
        self.leading.pairs.len() + self.inserted.pairs.len() + self.trailing.pairs.len()
    }
}
