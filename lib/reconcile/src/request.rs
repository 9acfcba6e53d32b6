use serde::{Deserialize, Serialize};

/// One analysis request observed on the system of record.
///
/// Ephemeral: owned by the reconciliation cycle that fetched it and
/// discarded once its outcome is published. A given
/// `(submission_id, dentist_email, tooth_number)` triple denotes exactly one
/// logical request, however many polling cycles observe it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub submission_id: String,
    pub dentist_name: String,
    pub dentist_email: String,
    pub patient_name: String,
    pub tooth_number: String,
    /// Locator of the uploaded radiograph, handed to the inference
    /// capability as-is. Absent when the dentist submitted without an
    /// attachment; such items fail per-item, they are never guessed.
    pub image_ref: Option<String>,
}
