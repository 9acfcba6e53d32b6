use async_trait::async_trait;

use implantx_catalog::Embedding;
use implantx_tracking::AnalysisContext;

use crate::error::Result;
use crate::request::AnalysisRequest;

/// External inference capability: radiograph in, embedding out.
///
/// Implementations must enforce their own per-call timeout; a hung call
/// would otherwise stall the whole cycle. Failures surface as
/// [`crate::Error::InferenceUnavailable`].
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn infer(&self, image_ref: &str) -> Result<Embedding>;
}

/// External system of record: the form-intake platform holding original
/// submissions and accepting published outcomes.
///
/// `publish_outcome` is idempotent only because the reconciler confirms the
/// identifier is unpublished first; the platform itself does not deduplicate
/// server-side.
#[async_trait]
pub trait SystemOfRecord: Send + Sync {
    /// All requests currently in active status. Pagination is handled
    /// upstream; the engine treats this as one logical call with a size cap.
    async fn list_active_requests(&self) -> Result<Vec<AnalysisRequest>>;

    /// Analysis identifiers of every already-published outcome.
    async fn list_published_keys(&self) -> Result<Vec<String>>;

    /// Publish one formatted outcome, keyed by the context's analysis
    /// identifier.
    async fn publish_outcome(
        &self,
        ctx: &AnalysisContext,
        report: &str,
        status_label: &str,
    ) -> Result<()>;
}
