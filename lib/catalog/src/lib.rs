//! # ImplantX Catalog
//!
//! Core library for the ImplantX implant-identification engine.
//!
//! This crate provides the reference-embedding catalog and the similarity
//! ranker:
//!
//! - [`Embedding`] - Fixed-length embedding vector with cosine similarity
//! - [`ImplantRecord`] - A reference implant with descriptive metadata
//! - [`EmbeddingStore`] - In-memory catalog with load/get/all/upsert
//! - [`Ranker`] - Top-K nearest-neighbor queries with similarity banding
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use implantx_catalog::{CatalogEntry, Embedding, EmbeddingStore, Ranker};
//!
//! let entries = vec![
//!     CatalogEntry {
//!         id: Some(1),
//!         name: "Straumann BLT".to_string(),
//!         manufacturer: Some("Straumann".to_string()),
//!         kind: None,
//!         reference_image: None,
//!         embedding: vec![1.0, 0.0, 0.0],
//!     },
//! ];
//! let store = Arc::new(EmbeddingStore::load(3, entries).unwrap());
//!
//! let ranker = Ranker::new(store);
//! let matches = ranker.rank(&Embedding::new(vec![1.0, 0.0, 0.0]), 3).unwrap();
//! assert_eq!(matches[0].record.id, 1);
//! ```

pub mod embedding;
pub mod error;
pub mod ranker;
pub mod record;
pub mod store;

pub use embedding::Embedding;
pub use error::{Error, Result};
pub use ranker::{Band, BandThresholds, Ranker, SimilarityMatch};
pub use record::{CatalogEntry, ImplantRecord};
pub use store::EmbeddingStore;
