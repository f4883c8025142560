//! Segmentation module
//!
//! This module provides:
//! - `SegmentationService` trait for abstracting the segmentation backend
//! - `HttpSegmentationService` calling the external service with a bounded timeout
//! - HTTP routes for `/api/segmentation`

pub mod routes;
mod service;
mod types;

pub use routes::segmentation_routes;
pub use service::{HttpSegmentationService, SegmentationService};
pub use types::{
    SegmentationError, SegmentationOutcome, SegmentationRecord, SegmentationRequest,
    SegmentationResponse, SegmentationResult, split_data_url, strip_data_url,
};
