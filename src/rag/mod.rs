//! RAG (Retrieval-Augmented Generation) module.
//!
//! This module provides:
//! - `DocumentStore`: read-only access to the indexed placement documents
//! - `Embedder`: query embedding through an external embedding service
//! - `AnswerService`: retrieval followed by generation with the placement prompt

mod chroma;
mod embedding;
pub mod prompt;
mod service;
mod store;

pub use chroma::ChromaStore;
pub use embedding::{Embedder, HttpEmbedder};
pub use service::{AnswerService, RagSettings};
pub use store::{DocumentStore, StoreState, StoreStatus};
