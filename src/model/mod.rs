//! Language-model collaborator
//!
//! One reply per request: the user message is embedded in a fixed prompt
//! template and sent to a hosted text-completion endpoint with a bounded
//! output-token budget.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::{Error, Result};

/// Generates the assistant reply for a user message
#[async_trait]
pub trait ReplyModel: Send + Sync {
    /// Produce the reply text for one user message
    ///
    /// # Errors
    ///
    /// Returns error if the model call fails
    async fn reply(&self, message: &str) -> Result<String>;
}

/// Text-completion API client
pub struct CompletionClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl CompletionClient {
    /// Create a new completion client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(config: &ModelConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::Config("model API key required".to_string()));
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens_to_sample: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    completion: String,
}

#[async_trait]
impl ReplyModel for CompletionClient {
    async fn reply(&self, message: &str) -> Result<String> {
        let request = CompletionRequest {
            model: &self.model,
            prompt: format!("\n\nHuman: {message}\n\nAssistant:"),
            max_tokens_to_sample: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/v1/complete", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Model(format!("completion error {status}: {body}")));
        }

        let completion: CompletionResponse = response.json().await?;
        Ok(completion.completion.trim().to_string())
    }
}
