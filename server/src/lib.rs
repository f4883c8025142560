//! Mammogram Segmentation Gateway Library
//!
//! This module exports the gateway components for use by the binary,
//! integration tests and client tooling.

pub mod client;
pub mod config;
pub mod rating;
pub mod segmentation;
pub mod server;
pub mod store;

mod test_utils;

// Re-export commonly used types
pub use client::{ClientError, GatewayClient, ViewerState};
pub use config::{Config, RunMode};
pub use rating::{Rating, RatingLabel, RatingRequest};
pub use segmentation::{
    HttpSegmentationService, SegmentationError, SegmentationRequest, SegmentationResult,
    SegmentationService,
};
pub use server::{AppState, build_router};
pub use store::{DocumentStore, InMemoryDocumentStore, MongoDocumentStore, StoreError};
