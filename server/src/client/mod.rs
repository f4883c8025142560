//! Client side of the gateway API
//!
//! `GatewayClient` wraps the two HTTP calls the web client makes;
//! `ViewerState` holds what the UI displays between them.

mod service;
mod state;

pub use service::{ClientError, GatewayClient};
pub use state::ViewerState;
