mod client;
pub(crate) mod types;

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::traits::{JsonAgent, JsonRequest};
use crate::util::parse_json_text;

use client::{ClaudeClient, ANTHROPIC_API_URL};
use types::*;

const TOOL_NAME: &str = "structured_response";

// =============================================================================
// Claude Agent
// =============================================================================

/// Claude backend. Structured output goes through a forced tool call whose
/// input schema is the requested response schema.
#[derive(Clone)]
pub struct Claude {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
    http: reqwest::Client,
}

impl Claude {
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

    fn client(&self) -> ClaudeClient<'_> {
        ClaudeClient::new(
            &self.api_key,
            &self.http,
            self.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL),
        )
    }

    pub(crate) fn build_request(&self, request: &JsonRequest) -> ChatRequest {
        let mut chat = ChatRequest::new(&self.model)
            .system(&request.system)
            .message(WireMessage::user(&request.user))
            .forced_tool(ToolDefinitionWire {
                name: TOOL_NAME.to_string(),
                description: format!("Return the {} as structured data.", request.schema_name),
                input_schema: request.schema.clone(),
            });

        if let Some(max_tokens) = request.options.max_output_tokens {
            chat = chat.max_tokens(max_tokens);
        }
        if let Some(temp) = request.options.temperature {
            chat = chat.temperature(temp);
        }
        chat
    }
}

// =============================================================================
// JsonAgent Implementation
// =============================================================================

#[async_trait]
impl JsonAgent for Claude {
    fn provider(&self) -> &'static str {
        "Claude"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn extract_value(&self, request: JsonRequest) -> Result<serde_json::Value> {
        if request.options.thinking_budget.is_some() {
            // Extended thinking cannot be combined with a forced tool choice.
            debug!("Ignoring thinking budget for Claude structured output");
        }

        let chat = self.build_request(&request);
        let response = self.client().chat(&chat).await?;

        if let Some(usage) = &response.usage {
            debug!(
                schema = %request.schema_name,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Claude structured output"
            );
        }

        structured_value(&response)
    }
}

/// Pull the forced tool's input out of a response. A response cut off at
/// max_tokens is an error even when a partial tool input came back.
fn structured_value(response: &ChatResponse) -> Result<serde_json::Value> {
    if response.stop_reason.as_deref() == Some("max_tokens") {
        return Err(anyhow!(
            "Claude response truncated at max_tokens before the {TOOL_NAME} call completed"
        ));
    }

    if let Some(input) = response.tool_input(TOOL_NAME) {
        return Ok(input.clone());
    }

    // Some models answer with plain JSON text instead of calling the tool.
    match response.text() {
        Some(text) => parse_json_text(text),
        None => Err(anyhow!(
            "No structured output in Claude response (stop_reason: {})",
            response.stop_reason.as_deref().unwrap_or("unknown")
        )),
    }
}
