//! Shared application state

use std::sync::Arc;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::segmentation::SegmentationService;
use crate::store::DocumentStore;

/// State shared by every request handler.
///
/// Both handles are created once at startup and cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    /// Outbound segmentation service
    pub segmentation_service: Arc<dyn SegmentationService>,
    /// Pooled document store handle
    pub store: Arc<dyn DocumentStore>,
    /// Record segmentation calls and expose `GET /api/segmentation`
    pub history_enabled: bool,
    /// Prometheus recorder handle backing `GET /metrics/prometheus`
    pub metrics: Option<PrometheusHandle>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        segmentation_service: Arc<dyn SegmentationService>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            segmentation_service,
            store,
            history_enabled: false,
            metrics: None,
            started_at: Instant::now(),
        }
    }

    /// Enable or disable segmentation history
    pub fn with_history(mut self, enabled: bool) -> Self {
        self.history_enabled = enabled;
        self
    }

    /// Expose metrics recorded through `handle`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
