//! Offline demo stub for the inference capability.
//!
//! The engine itself only ever ranks real query vectors; this stub exists
//! so the binary can be exercised end-to-end (`--offline-stub`) without a
//! running inference service. It synthesizes a deterministic unit vector
//! from the image locator text, so repeated runs over the same submissions
//! produce identical outcomes.

use async_trait::async_trait;

use implantx_catalog::Embedding;
use implantx_reconcile::{InferenceClient, Result};

pub struct StubInference {
    dim: usize,
}

impl StubInference {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

#[async_trait]
impl InferenceClient for StubInference {
    async fn infer(&self, image_ref: &str) -> Result<Embedding> {
        Ok(Embedding::new(hash_to_vector(image_ref, self.dim)))
    }
}

/// Hash text to a fixed-size normalized vector.
///
/// Character trigrams and whole words are hashed to vector positions;
/// words contribute more weight than trigrams.
fn hash_to_vector(text: &str, dim: usize) -> Vec<f32> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut vector = vec![0.0f32; dim];
    let normalized = text.to_lowercase();

    let padded = format!("  {}  ", normalized);
    let chars: Vec<char> = padded.chars().collect();
    for window in chars.windows(3) {
        let mut hasher = DefaultHasher::new();
        window.iter().collect::<String>().hash(&mut hasher);
        let pos = (hasher.finish() as usize) % dim;
        vector[pos] += 1.0;
    }

    for word in normalized.split_whitespace() {
        let mut hasher = DefaultHasher::new();
        word.hash(&mut hasher);
        let pos = (hasher.finish() as usize) % dim;
        vector[pos] += 2.0;
    }

    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for v in &mut vector {
            *v /= magnitude;
        }
    }

    vector
}
