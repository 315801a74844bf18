//! Renumbering of surviving pages

use serde::{Deserialize, Serialize};

use crate::error::{MutationError, Result};

/// New page `new_number` gets its data from old page `old_number`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecycleItem {
    pub new_number: usize,
    pub old_number: usize,
}

impl PageRecycleItem {
    pub fn new(new_number: usize, old_number: usize) -> Self {
        Self {
            new_number,
            old_number,
        }
    }
}

impl From<(usize, usize)> for PageRecycleItem {
    fn from((new_number, old_number): (usize, usize)) -> Self {
        Self::new(new_number, old_number)
    }
}

/// Ordered old→new page correspondence
///
/// Invariant: new numbers are exactly `1..=len()` in increasing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMap {
    items: Vec<PageRecycleItem>,
}

impl PositionMap {
    /// Map for a version of `total` pages after removing `deleted`.
    ///
    /// ```text
    /// total = 6, deleted = [1, 2]  ->  (1,3) (2,4) (3,5) (4,6)
    /// total = 5, deleted = [2, 3]  ->  (1,1) (2,4) (3,5)
    /// ```
    pub fn after_deletion(total: usize, deleted: &[usize]) -> Result<Self> {
        if deleted.len() > total {
            return Err(MutationError::InvalidArgument(format!(
                "{} pages deleted from a version of {} pages",
                deleted.len(),
                total
            )));
        }

        let mut removed = vec![false; total + 1];
        for &number in deleted {
            if number == 0 || number > total {
                return Err(MutationError::InvalidArgument(format!(
                    "deleted page {} is outside 1..={}",
                    number, total
                )));
            }
            removed[number] = true;
        }

        let items = (1..=total)
            .filter(|&old| !removed[old])
            .enumerate()
            .map(|(rank, old)| PageRecycleItem::new(rank + 1, old))
            .collect();

        Ok(Self { items })
    }

    /// Every page maps onto itself.
    pub fn identity(total: usize) -> Self {
        Self {
            items: (1..=total).map(|n| PageRecycleItem::new(n, n)).collect(),
        }
    }

    /// Build a map from arbitrary-order pairs.
    ///
    /// Pairs are sorted by new number; they must cover `1..=n` exactly once
    /// and reference old pages within `1..=source_total`.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = PageRecycleItem>,
        source_total: usize,
    ) -> Result<Self> {
        let mut items: Vec<PageRecycleItem> = pairs.into_iter().collect();
        items.sort_by_key(|item| item.new_number);

        for (index, item) in items.iter().enumerate() {
            if item.new_number != index + 1 {
                return Err(MutationError::InvalidArgument(format!(
                    "new page numbers must cover 1..={} exactly once, found {} at position {}",
                    items.len(),
                    item.new_number,
                    index + 1
                )));
            }
            if item.old_number == 0 || item.old_number > source_total {
                return Err(MutationError::InvalidPageIndex {
                    number: item.old_number,
                    page_count: source_total,
                });
            }
        }

        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageRecycleItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[PageRecycleItem] {
        &self.items
    }

    /// Old page numbers in new-page order
    pub fn old_numbers(&self) -> Vec<usize> {
        self.items.iter().map(|item| item.old_number).collect()
    }
}

impl<'a> IntoIterator for &'a PositionMap {
    type Item = &'a PageRecycleItem;
    type IntoIter = std::slice::Iter<'a, PageRecycleItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(map: &PositionMap) -> Vec<(usize, usize)> {
        map.iter().map(|i| (i.new_number, i.old_number)).collect()
    }

    #[test]
    fn test_delete_leading_pages() {
        let map = PositionMap::after_deletion(6, &[1, 2]).unwrap();
        assert_eq!(pairs(&map), vec![(1, 3), (2, 4), (3, 5), (4, 6)]);
    }

    #[test]
    fn test_delete_first_and_last() {
        let map = PositionMap::after_deletion(5, &[1, 5]).unwrap();
        assert_eq!(pairs(&map), vec![(1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn test_delete_middle_pages() {
        let map = PositionMap::after_deletion(5, &[2, 3]).unwrap();
        assert_eq!(pairs(&map), vec![(1, 1), (2, 4), (3, 5)]);
    }

    #[test]
    fn test_deleted_order_does_not_matter() {
        let map = PositionMap::after_deletion(5, &[3, 2]).unwrap();
        assert_eq!(pairs(&map), vec![(1, 1), (2, 4), (3, 5)]);
    }

    #[test]
    fn test_too_many_deleted() {
        let result = PositionMap::after_deletion(3, &[1, 2, 3, 4]);
        assert!(matches!(result, Err(MutationError::InvalidArgument(_))));
    }

    #[test]
    fn test_out_of_range_deleted_is_rejected() {
        let result = PositionMap::after_deletion(3, &[1, 4]);
        assert!(matches!(result, Err(MutationError::InvalidArgument(_))));

        let result = PositionMap::after_deletion(3, &[0]);
        assert!(matches!(result, Err(MutationError::InvalidArgument(_))));
    }

    #[test]
    fn test_delete_everything_and_nothing() {
        assert!(PositionMap::after_deletion(4, &[1, 2, 3, 4]).unwrap().is_empty());
        assert_eq!(PositionMap::after_deletion(3, &[]).unwrap(), PositionMap::identity(3));
    }

    #[test]
    fn test_map_properties_exhaustive() {
        // every subset of 1..=total for small totals
        for total in 0..=7usize {
            for mask in 0u32..(1 << total) {
                let deleted: Vec<usize> = (1..=total).filter(|n| mask & (1 << (n - 1)) != 0).collect();
                let map = PositionMap::after_deletion(total, &deleted).unwrap();

                assert_eq!(map.len(), total - deleted.len());
                for (index, item) in map.iter().enumerate() {
                    assert_eq!(item.new_number, index + 1);
                    assert!(item.old_number >= 1 && item.old_number <= total);
                    assert!(!deleted.contains(&item.old_number));
                }
                let olds = map.old_numbers();
                assert!(olds.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_from_pairs_sorts_by_new_number() {
        let map = PositionMap::from_pairs(
            vec![(3, 1).into(), (1, 3).into(), (2, 2).into()],
            3,
        )
        .unwrap();
        assert_eq!(pairs(&map), vec![(1, 3), (2, 2), (3, 1)]);
    }

    #[test]
    fn test_from_pairs_rejects_gaps_and_repeats() {
        let gap = PositionMap::from_pairs(vec![(1, 1).into(), (3, 2).into()], 3);
        assert!(matches!(gap, Err(MutationError::InvalidArgument(_))));

        let repeat = PositionMap::from_pairs(vec![(1, 1).into(), (1, 2).into()], 3);
        assert!(matches!(repeat, Err(MutationError::InvalidArgument(_))));

        let out_of_range = PositionMap::from_pairs(vec![(1, 9).into()], 3);
        assert!(matches!(
            out_of_range,
            Err(MutationError::InvalidPageIndex { number: 9, page_count: 3 })
        ));
    }
}
