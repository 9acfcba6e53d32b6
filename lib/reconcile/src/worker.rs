use std::sync::Arc;

use ahash::AHashSet;
use chrono::Utc;
use tracing::{error, info, warn};

use implantx_catalog::Ranker;
use implantx_tracking::{AnalysisContext, AnalysisId};

use crate::error::{Error, Result};
use crate::interfaces::{InferenceClient, SystemOfRecord};
use crate::report::render_outcome;
use crate::request::AnalysisRequest;

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// How many ranked matches each published outcome carries.
    pub top_k: usize,
    /// Status label written alongside a published outcome.
    pub status_label: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            status_label: "Analysis complete".to_string(),
        }
    }
}

/// Counters for one reconciliation cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    /// Requests fetched from the system of record.
    pub fetched: usize,
    /// Requests skipped because their identifier was already published.
    pub already_published: usize,
    /// Outcomes published this cycle.
    pub published: usize,
    /// Items that failed and stay pending for the next cycle.
    pub failed: usize,
}

/// Drives one fetch → diff → process → publish pass against the system of
/// record.
///
/// This is the only component that catches and logs failures. Component
/// errors below it stay typed and silent; here they are logged with the
/// triggering request's identifier, and the cycle moves on to the next
/// pending item. An item that fails is retried naturally on a later cycle
/// because its identifier never reaches the published set.
pub struct Reconciler {
    ranker: Ranker,
    record: Arc<dyn SystemOfRecord>,
    inference: Arc<dyn InferenceClient>,
    config: ReconcilerConfig,
}

impl Reconciler {
    pub fn new(
        ranker: Ranker,
        record: Arc<dyn SystemOfRecord>,
        inference: Arc<dyn InferenceClient>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            ranker,
            record,
            inference,
            config,
        }
    }

    /// Run one complete reconciliation cycle.
    ///
    /// Returns an error only for cycle-level failures (the source or
    /// published-set fetch); per-item failures are absorbed into
    /// [`CycleStats::failed`].
    pub async fn run_cycle(&self) -> Result<CycleStats> {
        let mut stats = CycleStats::default();

        let requests = self.record.list_active_requests().await?;
        stats.fetched = requests.len();
        if requests.is_empty() {
            info!("no active requests, cycle finished early");
            return Ok(stats);
        }

        // Deduplication is keyed on the full analysis identifier. Keys that
        // do not parse as one are foreign entries on the results form and
        // cannot suppress processing.
        let mut published: AHashSet<String> = self
            .record
            .list_published_keys()
            .await?
            .into_iter()
            .filter(|key| AnalysisId::validate(key))
            .collect();

        info!(
            fetched = stats.fetched,
            published = published.len(),
            "reconciling active requests"
        );

        for request in &requests {
            let ctx = match self.derive_context(request) {
                Ok(ctx) => ctx,
                Err(e) => {
                    warn!(
                        submission_id = %request.submission_id,
                        error = %e,
                        "request cannot be identified, skipping"
                    );
                    stats.failed += 1;
                    continue;
                }
            };

            if published.contains(ctx.analysis_id.as_str()) {
                info!(analysis_id = %ctx.analysis_id, "already published, skipping");
                stats.already_published += 1;
                continue;
            }

            match self.process_item(&ctx, request).await {
                Ok(()) => {
                    info!(analysis_id = %ctx.analysis_id, "outcome published");
                    // Collapses same-triple duplicates within one fetch.
                    published.insert(ctx.analysis_id.to_string());
                    stats.published += 1;
                }
                Err(e) => {
                    error!(
                        analysis_id = %ctx.analysis_id,
                        error = %e,
                        "item failed, will retry next cycle"
                    );
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }

    fn derive_context(&self, request: &AnalysisRequest) -> Result<AnalysisContext> {
        Ok(AnalysisContext::new(
            &request.submission_id,
            &request.dentist_name,
            &request.dentist_email,
            &request.patient_name,
            &request.tooth_number,
        )?)
    }

    async fn process_item(&self, ctx: &AnalysisContext, request: &AnalysisRequest) -> Result<()> {
        let image_ref = request.image_ref.as_deref().ok_or(Error::MissingImage)?;

        let query = self.inference.infer(image_ref).await?;
        let matches = self.ranker.rank(&query, self.config.top_k)?;
        let report = render_outcome(ctx, &matches, self.ranker.store().len(), Utc::now());

        self.record
            .publish_outcome(ctx, &report, &self.config.status_label)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    use implantx_catalog::{CatalogEntry, Embedding, EmbeddingStore};

    fn test_ranker() -> Ranker {
        let entries = (1..=3)
            .map(|i| CatalogEntry {
                id: Some(i),
                name: format!("implant-{i}"),
                manufacturer: None,
                kind: None,
                reference_image: None,
                embedding: match i {
                    1 => vec![1.0, 0.0],
                    2 => vec![0.0, 1.0],
                    _ => vec![0.7, 0.7],
                },
            })
            .collect();
        Ranker::new(Arc::new(EmbeddingStore::load(2, entries).unwrap()))
    }

    fn request(submission_id: &str, email: &str, tooth: &str) -> AnalysisRequest {
        AnalysisRequest {
            submission_id: submission_id.to_string(),
            dentist_name: "Ana Silva".to_string(),
            dentist_email: email.to_string(),
            patient_name: "Maria Souza".to_string(),
            tooth_number: tooth.to_string(),
            image_ref: Some(format!("https://cdn.example.com/{submission_id}.jpg")),
        }
    }

    struct FakeRecord {
        active: Vec<AnalysisRequest>,
        published: Mutex<Vec<String>>,
        reject_publishes: bool,
    }

    impl FakeRecord {
        fn new(active: Vec<AnalysisRequest>) -> Self {
            Self {
                active,
                published: Mutex::new(Vec::new()),
                reject_publishes: false,
            }
        }
    }

    #[async_trait]
    impl SystemOfRecord for FakeRecord {
        async fn list_active_requests(&self) -> Result<Vec<AnalysisRequest>> {
            Ok(self.active.clone())
        }

        async fn list_published_keys(&self) -> Result<Vec<String>> {
            Ok(self.published.lock().clone())
        }

        async fn publish_outcome(
            &self,
            ctx: &AnalysisContext,
            _report: &str,
            _status_label: &str,
        ) -> Result<()> {
            if self.reject_publishes {
                return Err(Error::Publish("rejected".to_string()));
            }
            self.published.lock().push(ctx.analysis_id.to_string());
            Ok(())
        }
    }

    struct FakeInference {
        /// Image refs that should fail as if the service were down.
        unavailable_for: Vec<String>,
    }

    impl FakeInference {
        fn ok() -> Self {
            Self {
                unavailable_for: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl InferenceClient for FakeInference {
        async fn infer(&self, image_ref: &str) -> Result<Embedding> {
            if self.unavailable_for.iter().any(|r| r == image_ref) {
                return Err(Error::InferenceUnavailable("service down".to_string()));
            }
            Ok(Embedding::new(vec![1.0, 0.0]))
        }
    }

    fn reconciler(record: Arc<FakeRecord>, inference: FakeInference) -> Reconciler {
        Reconciler::new(
            test_ranker(),
            record,
            Arc::new(inference),
            ReconcilerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_cycle_publishes_only_pending() {
        let requests = vec![
            request("1000000001", "a@example.com", "21"),
            request("1000000002", "b@example.com", "22"),
            request("1000000003", "c@example.com", "23"),
        ];
        let pre_published = AnalysisId::derive("1000000002", "b@example.com", "22").unwrap();

        let record = Arc::new(FakeRecord::new(requests));
        record.published.lock().push(pre_published.to_string());

        let worker = reconciler(record.clone(), FakeInference::ok());
        let stats = worker.run_cycle().await.unwrap();

        assert_eq!(stats.fetched, 3);
        assert_eq!(stats.already_published, 1);
        assert_eq!(stats.published, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(record.published.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_rerun_processes_nothing() {
        let requests = vec![
            request("1000000001", "a@example.com", "21"),
            request("1000000002", "b@example.com", "22"),
        ];
        let record = Arc::new(FakeRecord::new(requests));
        let worker = reconciler(record.clone(), FakeInference::ok());

        let first = worker.run_cycle().await.unwrap();
        assert_eq!(first.published, 2);

        let second = worker.run_cycle().await.unwrap();
        assert_eq!(second.published, 0);
        assert_eq!(second.already_published, 2);
        assert_eq!(record.published.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_one_failing_item_does_not_block_the_rest() {
        let requests = vec![
            request("1000000001", "a@example.com", "21"),
            request("1000000002", "b@example.com", "22"),
            request("1000000003", "c@example.com", "23"),
        ];
        let record = Arc::new(FakeRecord::new(requests));
        let inference = FakeInference {
            unavailable_for: vec!["https://cdn.example.com/1000000002.jpg".to_string()],
        };

        let worker = reconciler(record.clone(), inference);
        let stats = worker.run_cycle().await.unwrap();

        assert_eq!(stats.published, 2);
        assert_eq!(stats.failed, 1);

        // The failed item is still pending and goes through on the next
        // cycle once the service recovers.
        let worker = reconciler(record.clone(), FakeInference::ok());
        let stats = worker.run_cycle().await.unwrap();
        assert_eq!(stats.already_published, 2);
        assert_eq!(stats.published, 1);
        assert_eq!(record.published.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_unidentifiable_request_is_skipped() {
        let requests = vec![
            request("not-numeric", "a@example.com", "21"),
            request("1000000002", "b@example.com", "22"),
        ];
        let record = Arc::new(FakeRecord::new(requests));
        let worker = reconciler(record.clone(), FakeInference::ok());

        let stats = worker.run_cycle().await.unwrap();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.published, 1);
    }

    #[tokio::test]
    async fn test_missing_image_fails_per_item() {
        let mut bad = request("1000000001", "a@example.com", "21");
        bad.image_ref = None;
        let record = Arc::new(FakeRecord::new(vec![bad]));
        let worker = reconciler(record.clone(), FakeInference::ok());

        let stats = worker.run_cycle().await.unwrap();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.published, 0);
    }

    #[tokio::test]
    async fn test_duplicate_triple_in_one_fetch_collapses() {
        let requests = vec![
            request("1000000001", "a@example.com", "21"),
            request("1000000001", "a@example.com", "21"),
        ];
        let record = Arc::new(FakeRecord::new(requests));
        let worker = reconciler(record.clone(), FakeInference::ok());

        let stats = worker.run_cycle().await.unwrap();
        assert_eq!(stats.published, 1);
        assert_eq!(stats.already_published, 1);
        assert_eq!(record.published.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_publish_keeps_item_pending() {
        let requests = vec![request("1000000001", "a@example.com", "21")];
        let mut record = FakeRecord::new(requests);
        record.reject_publishes = true;
        let record = Arc::new(record);

        let worker = reconciler(record.clone(), FakeInference::ok());
        let stats = worker.run_cycle().await.unwrap();

        assert_eq!(stats.failed, 1);
        assert!(record.published.lock().is_empty());
    }
}
