//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Embeddings (OpenAI-compatible, or a deterministic mock)
//! - Vector storage (Qdrant, or in-memory)
//! - Chat completions (OpenAI-compatible)
//! - Catalog loading and the HTTP/CLI entry points

pub mod adapter;
pub mod api;

pub use adapter::*;
