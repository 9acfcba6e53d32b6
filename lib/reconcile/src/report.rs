use std::fmt::Write;

use chrono::{DateTime, Utc};

use implantx_catalog::SimilarityMatch;
use implantx_tracking::AnalysisContext;

/// Render the human-readable outcome report published for one request.
///
/// Pure formatting: the caller supplies the processing timestamp so the
/// same inputs always render the same text.
pub fn render_outcome(
    ctx: &AnalysisContext,
    matches: &[SimilarityMatch],
    catalog_size: usize,
    processed_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "IMPLANT ANALYSIS - TOOTH {}", ctx.tooth_number);
    let _ = writeln!(out, "Dentist: {}", ctx.dentist_name);
    let _ = writeln!(out, "Patient: {}", ctx.patient_name);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Ranked matches (reference catalog of {} implants):",
        catalog_size
    );
    let _ = writeln!(out, "{}", "=".repeat(50));

    for (rank, m) in matches.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "#{} - {}", rank + 1, m.record.name);
        if let Some(manufacturer) = &m.record.manufacturer {
            let _ = writeln!(out, "    Manufacturer: {}", manufacturer);
        }
        if let Some(kind) = &m.record.kind {
            let _ = writeln!(out, "    Type: {}", kind);
        }
        let _ = writeln!(
            out,
            "    Similarity: {:.1}% ({})",
            m.similarity * 100.0,
            m.band.label()
        );
        if let Some(reference) = &m.record.reference_image {
            let _ = writeln!(out, "    Ref: {}", reference);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Analysis id: {}", ctx.analysis_id);
    let _ = writeln!(
        out,
        "Generated by ImplantX v{}",
        env!("CARGO_PKG_VERSION")
    );
    let _ = writeln!(
        out,
        "Processed at: {}",
        processed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    out
}
