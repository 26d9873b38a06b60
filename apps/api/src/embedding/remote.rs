//! Remote encoder for OpenAI-compatible `/embeddings` endpoints.
//!
//! Blocking client: the engine is synchronous, so callers on an async runtime
//! must reach it through `spawn_blocking`.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{checked_vectors, EmbeddingError, EmbeddingProvider, Vector};

const MAX_RETRIES: u32 = 3;
const BATCH_SIZE: usize = 64;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct RemoteEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl RemoteEmbedder {
    /// Builds the client and probes the endpoint once. A failed probe means the
    /// model is unavailable, which is fatal for the whole engine.
    pub fn connect(
        base_url: &str,
        api_key: String,
        model: String,
        dimensions: usize,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EmbeddingError::ModelLoad(format!("HTTP client: {e}")))?;

        let embedder = Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key,
            model,
            dimensions,
        };

        embedder
            .encode("pathfinder startup probe")
            .map_err(|e| EmbeddingError::ModelLoad(format!("probe failed: {e}")))?;

        Ok(embedder)
    }

    fn request(&self, inputs: &[String]) -> Result<Vec<Vector>, EmbeddingError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: Some(self.dimensions),
        };

        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 500ms, 1s, 2s
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "embedding call attempt {} failed, retrying after {}ms",
                    attempt,
                    delay.as_millis()
                );
                thread::sleep(delay);
            }

            let response = match self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().unwrap_or_default();
                last_error = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let raw = response.text().unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&raw)
                    .map(|e| e.error.message)
                    .unwrap_or(raw);
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let mut parsed: EmbeddingResponse = response.json()?;
            parsed.data.sort_by_key(|d| d.index);

            if parsed.data.len() != inputs.len() {
                return Err(EmbeddingError::Malformed(format!(
                    "{} embeddings returned for {} inputs",
                    parsed.data.len(),
                    inputs.len()
                )));
            }

            let vectors = checked_vectors(parsed.data.into_iter().map(|d| d.embedding).collect(), self.dimensions)?;

            debug!("embedded {} inputs with {}", inputs.len(), self.model);
            return Ok(vectors);
        }

        Err(last_error.unwrap_or_else(|| {
            EmbeddingError::Malformed("no response after retries".to_string())
        }))
    }
}

impl EmbeddingProvider for RemoteEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn encode(&self, text: &str) -> Result<Vector, EmbeddingError> {
        let mut vectors = self.request(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::Malformed("empty embedding batch".to_string()))
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(BATCH_SIZE) {
            out.extend(self.request(chunk)?);
        }
        Ok(out)
    }
}
