use anyhow::Result;
use async_trait::async_trait;

use crate::schema::StructuredOutput;

// =============================================================================
// Request Types
// =============================================================================

/// Per-request generation knobs. Providers ignore what they don't support.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractOptions {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// Reasoning token budget (Gemini `thinkingConfig.thinkingBudget`).
    pub thinking_budget: Option<u32>,
}

/// A single structured-output request.
#[derive(Debug, Clone)]
pub struct JsonRequest {
    pub system: String,
    pub user: String,
    pub schema: serde_json::Value,
    pub schema_name: String,
    pub options: ExtractOptions,
}

impl JsonRequest {
    /// Build a request whose response schema is derived from `T`.
    pub fn for_type<T: StructuredOutput>(
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            schema: T::strict_schema(),
            schema_name: T::type_name(),
            options: ExtractOptions::default(),
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.options.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn thinking_budget(mut self, budget: u32) -> Self {
        self.options.thinking_budget = Some(budget);
        self
    }
}

// =============================================================================
// JsonAgent Trait
// =============================================================================

#[async_trait]
pub trait JsonAgent: Send + Sync {
    /// Short provider label used in logs and errors.
    fn provider(&self) -> &'static str;

    fn model(&self) -> &str;

    /// Send the request and return the provider's JSON payload undecoded.
    ///
    /// Errors cover transport failures, non-success statuses, and bodies that
    /// are not JSON at all.
    async fn extract_value(&self, request: JsonRequest) -> Result<serde_json::Value>;
}
