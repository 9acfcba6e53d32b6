//! # ImplantX
//!
//! Identifies dental implants from a radiograph by comparing a derived
//! image embedding against a catalog of reference implant embeddings,
//! returning a ranked shortlist of best matches, and reconciles incoming
//! analysis requests against an external system of record so each request
//! is processed at most once.
//!
//! ## Quick Start
//!
//! ```bash
//! export INTAKE_API_KEY=...
//! implantx --catalog data/implants.json --interval 60
//! ```
//!
//! ## Crate Structure
//!
//! - `implantx-catalog` - Reference-embedding catalog and similarity ranker
//! - `implantx-tracking` - Deterministic per-request analysis identifiers
//! - `implantx-reconcile` - Polling reconciliation loop and HTTP clients
//!
//! ## As a Library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use implantx::prelude::*;
//!
//! let store = Arc::new(EmbeddingStore::load_json_file(512, "implants.json").unwrap());
//! let ranker = Ranker::new(store);
//!
//! let query = Embedding::new(vec![0.0; 512]);
//! let matches = ranker.rank(&query, 3).unwrap();
//! for m in matches {
//!     println!("{} {:.1}% ({})", m.record.name, m.similarity * 100.0, m.band);
//! }
//! ```

pub mod stub;

// Re-export the engine surface
pub use implantx_catalog::{
    Band, BandThresholds, CatalogEntry, Embedding, EmbeddingStore, ImplantRecord, Ranker,
    SimilarityMatch,
};
pub use implantx_reconcile::{
    AnalysisRequest, CycleStats, FieldMap, FormIntakeClient, HttpInferenceClient, InferenceClient,
    IntakeConfig, Reconciler, ReconcilerConfig, Scheduler, SystemOfRecord,
};
pub use implantx_tracking::{AnalysisContext, AnalysisId};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AnalysisContext, AnalysisId, AnalysisRequest, Band, BandThresholds, CatalogEntry,
        CycleStats, Embedding, EmbeddingStore, FieldMap, FormIntakeClient, HttpInferenceClient,
        ImplantRecord, InferenceClient, IntakeConfig, Ranker, Reconciler, ReconcilerConfig,
        Scheduler, SimilarityMatch, SystemOfRecord,
    };
}
