//! In-memory document store for development mode and tests

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::service::DocumentStore;
use super::types::StoreError;
use crate::rating::Rating;
use crate::segmentation::SegmentationRecord;

/// Document store keeping everything in process memory.
///
/// Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    ratings: RwLock<Vec<Rating>>,
    segmentations: RwLock<Vec<SegmentationRecord>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of stored ratings in insertion order
    pub async fn ratings(&self) -> Vec<Rating> {
        self.ratings.read().await.clone()
    }

    pub async fn rating_count(&self) -> usize {
        self.ratings.read().await.len()
    }

    pub async fn segmentation_count(&self) -> usize {
        self.segmentations.read().await.len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_rating(&self, rating: &Rating) -> Result<(), StoreError> {
        self.ratings.write().await.push(rating.clone());
        Ok(())
    }

    async fn insert_segmentation(&self, record: &SegmentationRecord) -> Result<(), StoreError> {
        self.segmentations.write().await.push(record.clone());
        Ok(())
    }

    async fn list_segmentations(&self) -> Result<Vec<SegmentationRecord>, StoreError> {
        let mut records = self.segmentations.read().await.clone();
        // Stable sort keeps insertion order for equal timestamps
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
