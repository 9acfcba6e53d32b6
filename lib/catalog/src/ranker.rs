use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;
use crate::error::{Error, Result};
use crate::record::ImplantRecord;
use crate::store::EmbeddingStore;

/// Similarity thresholds used to derive a [`Band`] from a score.
///
/// Thresholds are configuration, not law; callers may tighten or loosen
/// them per deployment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BandThresholds {
    pub excellent: f32,
    pub good: f32,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.90,
            good: 0.85,
        }
    }
}

impl BandThresholds {
    pub fn band_for(&self, similarity: f32) -> Band {
        if similarity >= self.excellent {
            Band::Excellent
        } else if similarity >= self.good {
            Band::Good
        } else {
            Band::Moderate
        }
    }
}

/// Coarse similarity label attached to each match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Excellent,
    Good,
    Moderate,
}

impl Band {
    pub fn label(&self) -> &'static str {
        match self {
            Band::Excellent => "excellent similarity",
            Band::Good => "good similarity",
            Band::Moderate => "moderate similarity",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Excellent => write!(f, "excellent"),
            Band::Good => write!(f, "good"),
            Band::Moderate => write!(f, "moderate"),
        }
    }
}

/// One ranked catalog candidate for a query embedding.
#[derive(Debug, Clone)]
pub struct SimilarityMatch {
    pub record: ImplantRecord,
    /// Similarity in [0, 1], 1 = identical.
    pub similarity: f32,
    pub band: Band,
}

/// Ranks catalog records against a query embedding.
///
/// `rank` is a pure function of (query, catalog snapshot, k): no side
/// effects, no logging, and reproducible ordering across runs.
pub struct Ranker {
    store: Arc<EmbeddingStore>,
    bands: BandThresholds,
}

impl Ranker {
    pub fn new(store: Arc<EmbeddingStore>) -> Self {
        Self {
            store,
            bands: BandThresholds::default(),
        }
    }

    #[must_use]
    pub fn with_bands(mut self, bands: BandThresholds) -> Self {
        self.bands = bands;
        self
    }

    pub fn store(&self) -> &Arc<EmbeddingStore> {
        &self.store
    }

    /// Return the top `k` catalog records for `query`, best first.
    ///
    /// Raw cosine similarity is mapped into [0, 1] via `(cos + 1) / 2`;
    /// embeddings are not non-negative by construction, so the mapping is
    /// applied uniformly to every score this engine reports. Ties are
    /// broken by ascending catalog id. Asking for more results than the
    /// catalog holds is not an error; fewer than `k` matches come back.
    pub fn rank(&self, query: &Embedding, k: usize) -> Result<Vec<SimilarityMatch>> {
        if k == 0 {
            return Err(Error::InvalidArgument(
                "k must be greater than zero".to_string(),
            ));
        }
        if query.dim() != self.store.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.store.dim(),
                actual: query.dim(),
            });
        }

        let candidates = self.store.all();
        if candidates.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let mut scored: Vec<(ImplantRecord, f32)> = candidates
            .into_iter()
            .map(|record| {
                let cosine = record.embedding.cosine_similarity(query);
                (record, (cosine + 1.0) / 2.0)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(record, similarity)| SimilarityMatch {
                band: self.bands.band_for(similarity),
                record,
                similarity,
            })
            .collect())
    }
}
