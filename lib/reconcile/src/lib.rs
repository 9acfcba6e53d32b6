//! # ImplantX Reconcile
//!
//! Reconciliation loop for the ImplantX engine: polls the external system
//! of record for new analysis requests, determines which are unprocessed by
//! diffing against already-published outcomes, obtains a query embedding
//! for each, ranks it against the implant catalog, and publishes exactly
//! one outcome per request.
//!
//! Per cycle: fetch source → fetch published → diff → for each pending
//! item, infer → rank → format → publish. Per-item failures are logged and
//! skipped; the item stays pending and is retried on a later cycle because
//! its identifier never reached the published set. This crate is the only
//! place in the engine that logs.
//!
//! External collaborators are reached through the [`InferenceClient`] and
//! [`SystemOfRecord`] traits; [`HttpInferenceClient`] and
//! [`FormIntakeClient`] are the production implementations.

pub mod error;
pub mod inference;
pub mod intake;
pub mod interfaces;
pub mod report;
pub mod request;
pub mod scheduler;
pub mod worker;

pub use error::{Error, Result};
pub use inference::HttpInferenceClient;
pub use intake::{FieldMap, FormIntakeClient, IntakeConfig};
pub use interfaces::{InferenceClient, SystemOfRecord};
pub use report::render_outcome;
pub use request::AnalysisRequest;
pub use scheduler::Scheduler;
pub use worker::{CycleStats, Reconciler, ReconcilerConfig};
