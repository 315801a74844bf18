//! Reorder requests

use serde::{Deserialize, Serialize};

use super::recycle::{PageRecycleItem, PositionMap};
use crate::error::{MutationError, Result};

/// Page `old_number` moves to `new_number`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReorder {
    #[serde(alias = "old_number")]
    pub old_number: usize,
    #[serde(alias = "new_number")]
    pub new_number: usize,
}

impl PageReorder {
    pub fn new(old_number: usize, new_number: usize) -> Self {
        Self {
            old_number,
            new_number,
        }
    }
}

/// Old page numbers in new order for a version of `page_count` pages.
///
/// `pages_data` may list only the pages that moved; every other page keeps
/// its number. The completed list must be a permutation of `1..=page_count`.
///
/// ```text
/// page_count = 4, [(old 3 -> new 4), (old 4 -> new 3)]  ->  [1, 2, 4, 3]
/// ```
pub fn reordered_list(pages_data: &[PageReorder], page_count: usize) -> Result<Vec<usize>> {
    let mut order: Vec<usize> = (1..=page_count).collect();
    let mut assigned = vec![false; page_count + 1];

    for item in pages_data {
        for number in [item.old_number, item.new_number] {
            if number == 0 || number > page_count {
                return Err(MutationError::InvalidPageIndex { number, page_count });
            }
        }
        if assigned[item.new_number] {
            return Err(MutationError::InvalidArgument(format!(
                "new page number {} assigned more than once",
                item.new_number
            )));
        }
        assigned[item.new_number] = true;
        order[item.new_number - 1] = item.old_number;
    }

    let mut used = vec![false; page_count + 1];
    for &old in &order {
        if used[old] {
            return Err(MutationError::InvalidArgument(format!(
                "reorder is not a permutation: page {} would appear twice",
                old
            )));
        }
        used[old] = true;
    }

    Ok(order)
}

/// Position map equivalent of [`reordered_list`].
pub fn reorder_map(pages_data: &[PageReorder], page_count: usize) -> Result<PositionMap> {
    let order = reordered_list(pages_data, page_count)?;
    PositionMap::from_pairs(
        order
            .into_iter()
            .enumerate()
            .map(|(index, old)| PageRecycleItem::new(index + 1, old)),
        page_count,
    )
}
