//! DocumentStore trait definition

use async_trait::async_trait;

use super::types::StoreError;
use crate::rating::Rating;
use crate::segmentation::SegmentationRecord;

/// Trait for the document store holding ratings and segmentation history
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Insert one rating document
    async fn insert_rating(&self, rating: &Rating) -> Result<(), StoreError>;

    /// Insert one segmentation history record
    async fn insert_segmentation(&self, record: &SegmentationRecord) -> Result<(), StoreError>;

    /// List segmentation history records, newest first
    async fn list_segmentations(&self) -> Result<Vec<SegmentationRecord>, StoreError>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<(), StoreError>;

    /// Check if the store is reachable
    async fn is_available(&self) -> bool {
        self.ping().await.is_ok()
    }
}
