//! Carry per-page side data from old versions into new ones
//!
//! Side data is everything a page has besides its binary content: the
//! recognition artifacts kept by [`PageStorage`] and the page text kept on
//! the version entity.

use std::sync::Arc;

use crate::error::{MutationError, Result};
use crate::position::{MergePlan, PageRecycleItem, PositionMap, SegmentSource};
use crate::storage::PageStorage;
use crate::version::DocumentVersion;

/// Replicates recognition artifacts and page text along a position map
#[derive(Clone)]
pub struct SideDataReplicator {
    storage: Arc<dyn PageStorage>,
}

impl SideDataReplicator {
    pub fn new(storage: Arc<dyn PageStorage>) -> Self {
        Self { storage }
    }

    /// Copy the recognition artifacts of every mapped page, one copy per pair.
    pub async fn reuse_ocr_data(
        &self,
        old: &DocumentVersion,
        new: &DocumentVersion,
        map: &PositionMap,
    ) -> Result<()> {
        self.copy_pairs(old, new, map.items()).await
    }

    /// Text of `old`'s pages, in the order of `page_numbers`.
    pub fn collect_text_streams(
        version: &DocumentVersion,
        page_numbers: impl IntoIterator<Item = usize>,
    ) -> Result<Vec<String>> {
        page_numbers
            .into_iter()
            .map(|number| {
                version
                    .page(number)
                    .map(|page| page.text.clone())
                    .ok_or(MutationError::InvalidPageIndex {
                        number,
                        page_count: version.page_count,
                    })
            })
            .collect()
    }

    /// Rebuild `new`'s page texts from `old` following `map`.
    pub fn reuse_text_field(
        old: &DocumentVersion,
        new: &mut DocumentVersion,
        map: &PositionMap,
    ) -> Result<()> {
        let streams = Self::collect_text_streams(old, map.old_numbers())?;
        new.update_text_field(streams);
        Ok(())
    }

    /// Recognition artifacts and text, for single-source operations.
    pub async fn replicate(
        &self,
        old: &DocumentVersion,
        new: &mut DocumentVersion,
        map: &PositionMap,
    ) -> Result<()> {
        self.reuse_ocr_data(old, new, map).await?;
        Self::reuse_text_field(old, new, map)?;

        tracing::debug!(
            document_id = %new.document_id,
            from = old.number,
            to = new.number,
            pages = map.len(),
            "Replicated page side data"
        );
        Ok(())
    }

    /// Replicate a merge in three passes (leading, inserted, trailing).
    ///
    /// Text streams are gathered in destination page order across all
    /// passes and applied to `dst_new` once.
    pub async fn replicate_merge(
        &self,
        src_old: &DocumentVersion,
        dst_old: Option<&DocumentVersion>,
        dst_new: &mut DocumentVersion,
        plan: &MergePlan,
    ) -> Result<()> {
        let mut streams = Vec::with_capacity(plan.total());

        for segment in plan.segments() {
            if segment.pairs.is_empty() {
                continue;
            }

            let old = match segment.source {
                SegmentSource::Source => src_old,
                SegmentSource::Destination => dst_old.ok_or_else(|| {
                    MutationError::InvalidArgument(
                        "merge plan reads destination pages but the destination has no previous version"
                            .to_string(),
                    )
                })?,
            };

            self.copy_pairs(old, dst_new, &segment.pairs).await?;
            streams.extend(Self::collect_text_streams(
                old,
                segment.pairs.iter().map(|item| item.old_number),
            )?);
        }

        dst_new.update_text_field(streams);

        tracing::debug!(
            document_id = %dst_new.document_id,
            source_document_id = %src_old.document_id,
            position = plan.position(),
            pages = plan.total(),
            "Replicated merged page side data"
        );
        Ok(())
    }

    async fn copy_pairs(
        &self,
        old: &DocumentVersion,
        new: &DocumentVersion,
        pairs: &[PageRecycleItem],
    ) -> Result<()> {
        let old_path = old.document_path();
        let new_path = new.document_path();

        for item in pairs {
            self.storage
                .copy_page(&old_path.page(item.old_number), &new_path.page(item.new_number))
                .await?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::RecordingStorage;
    use super::*;
    use uuid::Uuid;

    fn version(texts: &[&str]) -> DocumentVersion {
        DocumentVersion::with_page_texts(Uuid::new_v4(), "doc.pdf", texts.iter().copied())
    }

    #[tokio::test]
    async fn test_replicate_after_deletion() {
        let storage = Arc::new(RecordingStorage::default());
        let replicator = SideDataReplicator::new(storage.clone());

        let old = version(&["one", "two", "three", "four", "five"]);
        let mut new = old.bump();
        let map = PositionMap::after_deletion(5, &[2, 3]).unwrap();

        replicator.replicate(&old, &mut new, &map).await.unwrap();

        assert_eq!(
            storage.copy_numbers(),
            vec![(1, 1, 2, 1), (1, 4, 2, 2), (1, 5, 2, 3)]
        );
        assert_eq!(new.page_count, 3);
        assert_eq!(new.text, "one four five");
        assert_eq!(new.page(2).unwrap().text, "four");
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let replicator = SideDataReplicator::new(Arc::new(RecordingStorage::failing()));
        let old = version(&["a"]);
        let mut new = old.bump();

        let result = replicator
            .replicate(&old, &mut new, &PositionMap::identity(1))
            .await;

        assert!(matches!(result, Err(MutationError::StorageCopy(_))));
    }

    #[tokio::test]
    async fn test_replicate_merge_three_passes() {
        let storage = Arc::new(RecordingStorage::default());
        let replicator = SideDataReplicator::new(storage.clone());

        let src_old = version(&["s1", "s2", "s3"]);
        let dst_old = version(&["d1", "d2", "d3"]);
        let mut dst_new = dst_old.bump();
        let plan = MergePlan::new(1, &[3, 1], Some(3)).unwrap();

        replicator
            .replicate_merge(&src_old, Some(&dst_old), &mut dst_new, &plan)
            .await
            .unwrap();

        let copies = storage.copies();
        assert_eq!(copies.len(), 5);
        // leading page from the destination, then the inserted block from the source
        assert_eq!(copies[0].0.document_path.document_id, dst_old.document_id);
        assert_eq!(copies[1].0.document_path.document_id, src_old.document_id);
        assert_eq!((copies[1].0.page_num, copies[1].1.page_num), (3, 2));
        assert_eq!((copies[4].0.page_num, copies[4].1.page_num), (3, 5));

        assert_eq!(dst_new.page_count, 5);
        assert_eq!(dst_new.text, "d1 s3 s1 d2 d3");
    }

    #[tokio::test]
    async fn test_replicate_merge_into_fresh_destination() {
        let storage = Arc::new(RecordingStorage::default());
        let replicator = SideDataReplicator::new(storage.clone());

        let src_old = version(&["s1", "s2"]);
        let mut dst_new = DocumentVersion::new(Uuid::new_v4(), "dst.pdf", 0);
        let plan = MergePlan::new(0, &[1, 2], None).unwrap();

        replicator
            .replicate_merge(&src_old, None, &mut dst_new, &plan)
            .await
            .unwrap();

        assert_eq!(storage.copies().len(), 2);
        assert_eq!(dst_new.text, "s1 s2");
    }

    #[test]
    fn test_collect_text_streams_unknown_page() {
        let old = version(&["a", "b"]);
        let result = SideDataReplicator::collect_text_streams(&old, [1, 3]);
        assert!(matches!(
            result,
            Err(MutationError::InvalidPageIndex { number: 3, page_count: 2 })
        ));
    }
}
