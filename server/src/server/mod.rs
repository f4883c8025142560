//! HTTP server plumbing: shared state, router assembly and common extractors

pub mod extract;
pub mod health;
pub mod metrics;
pub mod router;
pub mod state;

pub use extract::{BodyRejection, JsonBody};
pub use router::build_router;
pub use state::AppState;
