use chrono::{DateTime, Utc};

use crate::analysis_id::AnalysisId;
use crate::error::Result;

/// Everything the engine tracks about one analysis request.
///
/// The creation timestamp is recorded alongside the identifier, never inside
/// it; deriving the same request twice yields the same id with different
/// timestamps.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub analysis_id: AnalysisId,
    pub submission_id: String,
    pub dentist_name: String,
    pub dentist_email: String,
    pub patient_name: String,
    pub tooth_number: String,
    pub created_at: DateTime<Utc>,
}

impl AnalysisContext {
    pub fn new(
        submission_id: &str,
        dentist_name: &str,
        dentist_email: &str,
        patient_name: &str,
        tooth_number: &str,
    ) -> Result<Self> {
        let analysis_id = AnalysisId::derive(submission_id, dentist_email, tooth_number)?;
        Ok(Self {
            analysis_id,
            submission_id: submission_id.to_string(),
            dentist_name: dentist_name.to_string(),
            dentist_email: dentist_email.to_string(),
            patient_name: patient_name.to_string(),
            tooth_number: tooth_number.to_string(),
            created_at: Utc::now(),
        })
    }
}
