mod client;
pub(crate) mod types;

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::traits::{JsonAgent, JsonRequest};
use crate::util::parse_json_text;

use client::{GeminiClient, GEMINI_API_URL};
use types::*;

// =============================================================================
// Gemini Agent
// =============================================================================

/// Gemini backend using JSON mode with a response schema.
#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
    http: reqwest::Client,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Apply a whole-request timeout to every call.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    fn client(&self) -> GeminiClient<'_> {
        GeminiClient::new(
            &self.api_key,
            &self.http,
            self.base_url.as_deref().unwrap_or(GEMINI_API_URL),
        )
    }

    pub(crate) fn build_request(&self, request: &JsonRequest) -> GenerateRequest {
        let mut config = GenerationConfig::json();
        config.response_json_schema = Some(request.schema.clone());
        config.temperature = request.options.temperature;
        config.max_output_tokens = request.options.max_output_tokens;
        config.thinking_config = request
            .options
            .thinking_budget
            .map(|thinking_budget| ThinkingConfig { thinking_budget });

        GenerateRequest {
            contents: vec![Content::user(&request.user)],
            system_instruction: Some(Content::system(&request.system)),
            generation_config: config,
        }
    }
}

// =============================================================================
// JsonAgent Implementation
// =============================================================================

#[async_trait]
impl JsonAgent for Gemini {
    fn provider(&self) -> &'static str {
        "Gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn extract_value(&self, request: JsonRequest) -> Result<serde_json::Value> {
        let body = self.build_request(&request);
        let response = self.client().generate(&self.model, &body).await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                schema = %request.schema_name,
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                thoughts_tokens = usage.thoughts_token_count,
                "Gemini structured output"
            );
        }

        if let Some(reason) = response.block_reason() {
            return Err(anyhow!("Gemini blocked the prompt: {}", reason));
        }

        let text = response.text().ok_or_else(|| {
            anyhow!(
                "No text in Gemini response (finish_reason: {})",
                response.finish_reason().unwrap_or("unknown")
            )
        })?;

        if response.finish_reason() == Some("MAX_TOKENS") {
            return Err(anyhow!(
                "Gemini response truncated at max output tokens ({} chars received)",
                text.len()
            ));
        }

        parse_json_text(&text)
    }
}
