//! Document store module
//!
//! This module provides:
//! - `DocumentStore` trait for abstracting the persistence backend
//! - `MongoDocumentStore` backed by a pooled MongoDB client
//! - `InMemoryDocumentStore` for development mode and tests

mod memory;
mod mongo;
mod service;
mod types;

pub use memory::InMemoryDocumentStore;
pub use mongo::MongoDocumentStore;
pub use service::DocumentStore;
pub use types::StoreError;
