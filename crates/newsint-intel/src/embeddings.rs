//! TEI (Text Embeddings Inference) client for fingerprint generation.

use std::time::Duration;

use serde::Serialize;

use crate::codec::{zero_vector, EMBEDDING_DIM};
use crate::error::IntelError;
use crate::types::Sourced;

/// TEI HTTP client.
///
/// Use [`EmbeddingClient::new`] for production or point `base_url` at a
/// mock server in tests.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: [&'a str; 1],
}

impl EmbeddingClient {
    /// Create a new `EmbeddingClient` with a bounded request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`IntelError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, IntelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/embed", base_url.trim_end_matches('/')),
        })
    }

    /// Generate the fingerprint vector for one text.
    ///
    /// Single attempt, no retry: callers that can degrade should use
    /// [`EmbeddingClient::embed_or_zero`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`IntelError::Embedding`] if the request fails, the response
    /// cannot be parsed, or the vector has the wrong dimension.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, IntelError> {
        let request = EmbedRequest { inputs: [text] };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| IntelError::Embedding(format!("embed request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(IntelError::Embedding(format!(
                "embedding service returned status {}",
                response.status()
            )));
        }

        let mut embeddings: Vec<Vec<f32>> = response
            .json()
            .await
            .map_err(|e| IntelError::Embedding(format!("embed response parse error: {e}")))?;

        let Some(vector) = embeddings.pop() else {
            return Err(IntelError::Embedding(
                "embedding service returned no vectors".to_string(),
            ));
        };

        if vector.len() != EMBEDDING_DIM {
            return Err(IntelError::Embedding(format!(
                "embedding service returned dimension {} (expected {EMBEDDING_DIM})",
                vector.len()
            )));
        }

        Ok(vector)
    }

    /// Fail-soft wrapper around [`EmbeddingClient::embed`].
    ///
    /// Any failure degrades to the zero vector (logged) so ingestion and
    /// search never abort on an embedding outage.
    pub async fn embed_or_zero(&self, text: &str) -> Sourced<Vec<f32>> {
        match self.embed(text).await {
            Ok(vector) => Sourced::Computed(vector),
            Err(e) => {
                tracing::warn!(error = %e, "embedding failed, substituting zero vector");
                Sourced::Degraded(zero_vector())
            }
        }
    }
}
