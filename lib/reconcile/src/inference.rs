use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use implantx_catalog::Embedding;

use crate::error::{Error, Result};
use crate::interfaces::InferenceClient;

/// HTTP client for the external inference service.
///
/// The service is reached as "given an image locator, return a fixed-length
/// vector"; anything else (non-2xx, timeout, malformed body) is
/// [`Error::InferenceUnavailable`] and handled by the per-item failure
/// policy of the reconciliation loop.
pub struct HttpInferenceClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct InferRequest<'a> {
    image_url: &'a str,
}

#[derive(Deserialize)]
struct InferResponse {
    embedding: Vec<f32>,
}

impl HttpInferenceClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("implantx/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::InferenceUnavailable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn infer(&self, image_ref: &str) -> Result<Embedding> {
        let url = format!("{}/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&InferRequest {
                image_url: image_ref,
            })
            .send()
            .await
            .map_err(|e| Error::InferenceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::InferenceUnavailable(format!(
                "inference service returned {}",
                response.status()
            )));
        }

        let body: InferResponse = response
            .json()
            .await
            .map_err(|e| Error::InferenceUnavailable(e.to_string()))?;
        Ok(Embedding::new(body.embedding))
    }
}
