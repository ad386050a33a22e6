//! HTTP client for an OpenAI-compatible chat-completions service.
//!
//! The hosted model is consumed as a black box: structured prompt in,
//! completion text out. Parsing of the embedded JSON happens in
//! [`crate::analysis`], never here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::IntelError;

/// Chat-completions HTTP client.
///
/// Use [`CompletionClient::new`] for production or point `base_url` at a
/// mock server in tests.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl CompletionClient {
    /// Create a new `CompletionClient` with a bounded request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`IntelError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, IntelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.map(ToOwned::to_owned),
            model: model.to_owned(),
        })
    }

    /// Send one prompt as a single user message and return the completion
    /// text. Single attempt, no retry.
    ///
    /// # Errors
    ///
    /// Returns [`IntelError::Completion`] if the request fails, the service
    /// returns a non-success status, or the response carries no choices.
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, IntelError> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| IntelError::Completion(format!("completion request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(IntelError::Completion(format!(
                "completion service returned status {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| IntelError::Completion(format!("completion response parse error: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| IntelError::Completion("completion carried no choices".to_string()))
    }
}
