//! # ImplantX Tracking
//!
//! Analysis identifier scheme for the ImplantX engine.
//!
//! Ties a single physical request (one tooth, one patient, one dentist, one
//! submission) to exactly one analysis outcome via a deterministic,
//! privacy-preserving identifier:
//!
//! ```text
//! {submission_id}_{email_fingerprint}_{tooth_number}
//! ```
//!
//! ## Example
//!
//! ```rust
//! use implantx_tracking::AnalysisId;
//!
//! let id = AnalysisId::derive("5123456789", "doc@example.com", "21").unwrap();
//! assert!(AnalysisId::validate(id.as_str()));
//! assert_eq!(AnalysisId::submission_id_of(id.as_str()), Some("5123456789"));
//! ```

pub mod analysis_id;
pub mod context;
pub mod error;

pub use analysis_id::AnalysisId;
pub use context::AnalysisContext;
pub use error::{Error, Result};
