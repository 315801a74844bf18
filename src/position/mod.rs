//! Page position mapping
//!
//! Pure integer arithmetic describing which page of an old version feeds
//! which page of a new version. The same map drives the binary artifact,
//! page text and recognition artifacts, so all three stay in lock-step.
//!
//! - [`PositionMap::after_deletion`]: survivors of a deletion, renumbered
//! - [`MergePlan`]: leading / inserted / trailing passes of an insertion
//! - [`reordered_list`]: completes a sparse reorder request into a permutation

mod merge;
mod recycle;
mod reorder;

pub use merge::{inserted_pairs, leading_pairs, trailing_pairs, MergePlan, MergeSegment, SegmentSource};
pub use recycle::{PageRecycleItem, PositionMap};
pub use reorder::{reorder_map, reordered_list, PageReorder};

use crate::error::{MutationError, Result};

/// Check that `page_numbers` is a duplicate-free, non-empty selection of
/// pages from a version with `page_count` pages.
pub fn validate_selection(page_numbers: &[usize], page_count: usize) -> Result<()> {
    if page_numbers.is_empty() {
        return Err(MutationError::InvalidArgument(
            "no page numbers given".to_string(),
        ));
    }

    let mut seen = vec![false; page_count + 1];
    for &number in page_numbers {
        if number == 0 || number > page_count {
            return Err(MutationError::InvalidPageIndex { number, page_count });
        }
        if seen[number] {
            return Err(MutationError::InvalidArgument(format!(
                "page {} selected more than once",
                number
            )));
        }
        seen[number] = true;
    }

    Ok(())
}
