use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;

use implantx_tracking::AnalysisContext;

use crate::error::{Error, Result};
use crate::interfaces::SystemOfRecord;
use crate::request::AnalysisRequest;

/// Form field ids on the intake platform.
///
/// The platform addresses answers by per-form numeric field id, so the
/// mapping is configuration rather than code. Defaults match the deployed
/// intake and results forms.
#[derive(Debug, Clone)]
pub struct FieldMap {
    pub dentist_name: String,
    pub email: String,
    pub patient_name: String,
    pub tooth_number: String,
    pub image_upload: String,
    pub result: String,
    pub status: String,
    /// Results-form field holding the analysis identifier. This is the
    /// deduplication key read back by `list_published_keys`.
    pub tracking_id: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            dentist_name: "12".to_string(),
            email: "14".to_string(),
            patient_name: "4".to_string(),
            tooth_number: "6".to_string(),
            image_upload: "17".to_string(),
            result: "48".to_string(),
            status: "49".to_string(),
            tracking_id: "50".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub base_url: String,
    pub api_key: String,
    /// Form receiving dentist submissions (the source of requests).
    pub main_form_id: String,
    /// Form receiving published outcomes.
    pub results_form_id: String,
    /// Upstream page-size cap for submission listings.
    pub page_limit: usize,
    pub request_timeout: Duration,
    pub fields: FieldMap,
}

/// HTTP client for the form-intake platform.
pub struct FormIntakeClient {
    config: IntakeConfig,
    client: reqwest::Client,
}

impl FormIntakeClient {
    pub fn new(config: IntakeConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let mut api_key = header::HeaderValue::from_str(&config.api_key)
            .map_err(|e| Error::SourceFetch(format!("unusable API key: {e}")))?;
        api_key.set_sensitive(true);
        headers.insert(header::HeaderName::from_static("apikey"), api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("implantx/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::SourceFetch(e.to_string()))?;

        Ok(Self { config, client })
    }

    async fn list_submissions(&self, form_id: &str) -> Result<Vec<WireSubmission>> {
        let url = format!(
            "{}/form/{}/submissions?limit={}&status=ACTIVE",
            self.config.base_url, form_id, self.config.page_limit
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::SourceFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::SourceFetch(format!(
                "form {} listing returned {}",
                form_id,
                response.status()
            )));
        }

        let envelope: SubmissionsEnvelope = response
            .json()
            .await
            .map_err(|e| Error::SourceFetch(e.to_string()))?;
        Ok(envelope.content)
    }
}

#[async_trait]
impl SystemOfRecord for FormIntakeClient {
    async fn list_active_requests(&self) -> Result<Vec<AnalysisRequest>> {
        let fields = &self.config.fields;
        let submissions = self.list_submissions(&self.config.main_form_id).await?;

        Ok(submissions
            .into_iter()
            .map(|sub| AnalysisRequest {
                submission_id: sub.id.clone(),
                dentist_name: sub.answer_text(&fields.dentist_name).unwrap_or_default(),
                dentist_email: sub.answer_text(&fields.email).unwrap_or_default(),
                patient_name: sub.answer_text(&fields.patient_name).unwrap_or_default(),
                tooth_number: sub.answer_text(&fields.tooth_number).unwrap_or_default(),
                image_ref: sub.answer_text(&fields.image_upload),
            })
            .collect())
    }

    async fn list_published_keys(&self) -> Result<Vec<String>> {
        let fields = &self.config.fields;
        let submissions = self.list_submissions(&self.config.results_form_id).await?;

        Ok(submissions
            .iter()
            .filter_map(|sub| sub.answer_text(&fields.tracking_id))
            .collect())
    }

    async fn publish_outcome(
        &self,
        ctx: &AnalysisContext,
        report: &str,
        status_label: &str,
    ) -> Result<()> {
        let fields = &self.config.fields;
        let url = format!(
            "{}/form/{}/submissions",
            self.config.base_url, self.config.results_form_id
        );

        // Name fields are split into first/last sub-fields on the platform.
        let (first, last) = match ctx.dentist_name.split_once(' ') {
            Some((first, last)) => (first, last),
            None => (ctx.dentist_name.as_str(), ""),
        };

        let params: Vec<(String, String)> = vec![
            (submission_key(&fields.dentist_name, "_first"), first.to_string()),
            (submission_key(&fields.dentist_name, "_last"), last.to_string()),
            (submission_key(&fields.email, ""), ctx.dentist_email.clone()),
            (submission_key(&fields.patient_name, ""), ctx.patient_name.clone()),
            (submission_key(&fields.tooth_number, ""), ctx.tooth_number.clone()),
            (submission_key(&fields.result, ""), report.to_string()),
            (submission_key(&fields.status, ""), status_label.to_string()),
            (
                submission_key(&fields.tracking_id, ""),
                ctx.analysis_id.to_string(),
            ),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Publish(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Publish(format!(
                "results form returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

fn submission_key(field_id: &str, suffix: &str) -> String {
    format!("submission[{field_id}{suffix}]")
}

#[derive(Debug, Deserialize)]
struct SubmissionsEnvelope {
    #[serde(default)]
    content: Vec<WireSubmission>,
}

#[derive(Debug, Deserialize)]
struct WireSubmission {
    id: String,
    #[serde(default)]
    answers: HashMap<String, WireAnswer>,
}

impl WireSubmission {
    /// Extract one answer as display text, `None` when missing or blank.
    fn answer_text(&self, field_id: &str) -> Option<String> {
        let text = self.answers.get(field_id)?.answer.as_ref()?.to_text();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireAnswer {
    #[serde(default)]
    answer: Option<AnswerValue>,
}

/// Answer payloads vary by field type: plain strings, `{first, last}` name
/// objects, lists of upload URLs, or arbitrary JSON for anything else.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnswerValue {
    Text(String),
    Name {
        first: Option<String>,
        last: Option<String>,
    },
    Many(Vec<String>),
    Other(serde_json::Value),
}

impl AnswerValue {
    fn to_text(&self) -> String {
        match self {
            AnswerValue::Text(s) => s.trim().to_string(),
            AnswerValue::Name { first, last } => {
                let first = first.as_deref().unwrap_or("");
                let last = last.as_deref().unwrap_or("");
                format!("{first} {last}").trim().to_string()
            }
            // Upload fields carry a list of locators; the first one is the
            // radiograph this request is about.
            AnswerValue::Many(items) => items.first().cloned().unwrap_or_default(),
            AnswerValue::Other(value) => value.to_string(),
        }
    }
}
