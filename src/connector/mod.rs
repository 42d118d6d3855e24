//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Embeddings (ONNX Runtime, or a deterministic mock)
//! - Reasoning model (Messages API, or a deterministic mock)
//! - Listing storage (DuckDB or in-memory) and the scraper service
//! - The CLI api layer wiring it all together

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
