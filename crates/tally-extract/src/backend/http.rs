//! OpenAI-compatible chat completions backend.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tally_core::models::ExtractionConfig;
use tally_core::{BatchExtractor, BatchResult, ExtractionRequest};
use tracing::{debug, info};

use super::parse_batch_result;
use crate::prompt::{system_prompt, user_prompt};
use crate::{ExtractError, Result};

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Extracts transactions by asking a chat completions model.
pub struct LlmExtractor {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
    max_tokens: u32,
}

impl LlmExtractor {
    pub fn new(api_base: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        let defaults = ExtractionConfig::default();
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            model: model.into(),
            api_key: api_key.into(),
            max_tokens: defaults.max_tokens,
        }
    }

    /// Build an extractor from configuration, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ExtractError::MissingApiKey(config.api_key_env.clone()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            api_key,
            max_tokens: config.max_tokens,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    fn request_body(&self, request: &ExtractionRequest<'_>) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt(),
                },
                Message {
                    role: "user",
                    content: user_prompt(request),
                },
            ],
            temperature: 0.0,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat { kind: "json_object" },
        }
    }

    async fn complete(&self, request: &ExtractionRequest<'_>) -> Result<String> {
        let body = self.request_body(request);

        let resp = self
            .client
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ExtractError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let out: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ExtractError::InvalidResponse(e.to_string()))?;

        out.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ExtractError::InvalidResponse("empty completion".to_string()))
    }
}

impl BatchExtractor for LlmExtractor {
    type Error = ExtractError;

    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<BatchResult> {
        info!(
            "Extracting batch {}/{} with {} ({} characters)",
            request.batch_number,
            request.total_batches,
            self.model,
            request.text.len()
        );

        let content = self.complete(&request).await?;
        debug!("Batch {} answer: {} characters", request.batch_number, content.len());

        parse_batch_result(&content)
    }
}
