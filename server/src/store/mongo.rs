//! MongoDB document store
//!
//! The client is created once at startup. The driver keeps a connection pool
//! internally, so every operation checks a connection out and returns it when
//! the operation completes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::service::DocumentStore;
use super::types::StoreError;
use crate::config::StoreConfig;
use crate::rating::{Rating, RatingLabel};
use crate::segmentation::{SegmentationOutcome, SegmentationRecord};

const APP_NAME: &str = "mammogram-gateway";

/// Rating as stored in MongoDB (`createdAt` is a native BSON date)
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatingDocument {
    rating: RatingLabel,
    rating_value: i32,
    created_at: bson::DateTime,
}

impl From<&Rating> for RatingDocument {
    fn from(r: &Rating) -> Self {
        Self {
            rating: r.rating,
            rating_value: i32::from(r.rating_value),
            created_at: to_bson_date(r.created_at),
        }
    }
}

/// Segmentation history record as stored in MongoDB
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentationDocument {
    request_id: String,
    created_at: bson::DateTime,
    image_length: i64,
    outcome: SegmentationOutcome,
    latency_ms: i64,
}

impl From<&SegmentationRecord> for SegmentationDocument {
    fn from(r: &SegmentationRecord) -> Self {
        Self {
            request_id: r.id.to_string(),
            created_at: to_bson_date(r.created_at),
            image_length: r.image_length as i64,
            outcome: r.outcome,
            latency_ms: r.latency_ms as i64,
        }
    }
}

impl TryFrom<SegmentationDocument> for SegmentationRecord {
    type Error = StoreError;

    fn try_from(d: SegmentationDocument) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&d.request_id)
            .map_err(|e| StoreError::InvalidDocument(format!("requestId: {}", e)))?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(d.created_at.timestamp_millis())
            .ok_or_else(|| StoreError::InvalidDocument("createdAt out of range".to_string()))?;
        Ok(Self {
            id,
            created_at,
            image_length: d.image_length.max(0) as u64,
            outcome: d.outcome,
            latency_ms: d.latency_ms.max(0) as u64,
        })
    }
}

fn to_bson_date(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

/// Classify a driver error: selection failures mean the server is unreachable
fn map_mongo_error(e: mongodb::error::Error) -> StoreError {
    match *e.kind {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
            StoreError::Unavailable(e.to_string())
        }
        _ => StoreError::Backend(e.to_string()),
    }
}

/// Document store backed by a pooled MongoDB client
pub struct MongoDocumentStore {
    database: Database,
    ratings: Collection<RatingDocument>,
    segmentations: Collection<SegmentationDocument>,
}

impl MongoDocumentStore {
    /// Create the shared client for `uri` using the pool settings in `config`.
    ///
    /// The driver connects lazily; use [`DocumentStore::ping`] to verify reachability.
    pub async fn connect(uri: &str, config: &StoreConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| StoreError::Unavailable(format!("invalid connection string: {}", e)))?;
        options.app_name = Some(APP_NAME.to_string());
        options.max_pool_size = Some(config.max_pool_size);
        options.server_selection_timeout = Some(config.server_selection_timeout);

        let client = Client::with_options(options).map_err(map_mongo_error)?;
        let database = client.database(&config.database);

        info!(
            "Initialized MongoDB store: database={}, ratings={}, segmentations={}, pool={}",
            config.database,
            config.rating_collection,
            config.segmentation_collection,
            config.max_pool_size
        );

        Ok(Self {
            ratings: database.collection(&config.rating_collection),
            segmentations: database.collection(&config.segmentation_collection),
            database,
        })
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn insert_rating(&self, rating: &Rating) -> Result<(), StoreError> {
        let result = self
            .ratings
            .insert_one(RatingDocument::from(rating))
            .await
            .map_err(map_mongo_error)?;
        debug!("Inserted rating document {}", result.inserted_id);
        Ok(())
    }

    async fn insert_segmentation(&self, record: &SegmentationRecord) -> Result<(), StoreError> {
        self.segmentations
            .insert_one(SegmentationDocument::from(record))
            .await
            .map_err(map_mongo_error)?;
        Ok(())
    }

    async fn list_segmentations(&self) -> Result<Vec<SegmentationRecord>, StoreError> {
        let documents: Vec<SegmentationDocument> = self
            .segmentations
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;

        documents
            .into_iter()
            .map(SegmentationRecord::try_from)
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(map_mongo_error)?;
        Ok(())
    }
}
