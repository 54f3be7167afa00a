use std::sync::Arc;

use ai_client::claude::Claude;
use ai_client::gemini::Gemini;
use ai_client::{JsonAgent, JsonRequest, StructuredOutput};
use async_trait::async_trait;
use tracing::{debug, info};

use flyerforge_common::config::DEFAULT_DRAFT_THINKING_BUDGET;
use flyerforge_common::{
    Brief, BrandIdentity, CampaignBrief, Config, ConceptVariant, DesignArtifact, ForgeError,
    Provider,
};

use crate::generator::{
    AuditOutcome, AuditResponse, DesignGenerator, DraftOutcome, DraftResponse, Stage,
    StrategyOutcome, StrategyResponse, ValidationResponse,
};
use crate::prompts;

/// `DesignGenerator` backed by a hosted model through ai-client.
pub struct LlmGenerator {
    agent: Arc<dyn JsonAgent>,
    draft_thinking_budget: u32,
}

impl LlmGenerator {
    pub fn new(agent: Arc<dyn JsonAgent>) -> Self {
        Self {
            agent,
            draft_thinking_budget: DEFAULT_DRAFT_THINKING_BUDGET,
        }
    }

    pub fn with_draft_thinking_budget(mut self, budget: u32) -> Self {
        self.draft_thinking_budget = budget;
        self
    }

    /// Build the provider client named by `config`.
    pub fn from_config(config: &Config) -> Result<Self, ForgeError> {
        let agent: Arc<dyn JsonAgent> = match config.provider {
            Provider::Gemini => {
                let mut gemini = Gemini::new(&config.api_key, &config.model)
                    .with_timeout(config.request_timeout)
                    .map_err(|e| ForgeError::Config(e.to_string()))?;
                if let Some(url) = &config.base_url {
                    gemini = gemini.with_base_url(url);
                }
                Arc::new(gemini)
            }
            Provider::Claude => {
                let mut claude = Claude::new(&config.api_key, &config.model)
                    .with_timeout(config.request_timeout)
                    .map_err(|e| ForgeError::Config(e.to_string()))?;
                if let Some(url) = &config.base_url {
                    claude = claude.with_base_url(url);
                }
                Arc::new(claude)
            }
        };

        info!(
            provider = agent.provider(),
            model = agent.model(),
            "Generation client ready"
        );
        Ok(Self::new(agent).with_draft_thinking_budget(config.draft_thinking_budget))
    }

    async fn call<T: StructuredOutput>(
        &self,
        stage: Stage,
        request: JsonRequest,
    ) -> Result<T, ForgeError> {
        debug!(
            stage = stage.as_str(),
            schema = request.schema_name.as_str(),
            prompt_chars = request.user.len(),
            "Sending generation request"
        );

        let value = self
            .agent
            .extract_value(request)
            .await
            .map_err(|e| ForgeError::transport(stage.as_str(), e))?;

        serde_json::from_value(value).map_err(|e| {
            ForgeError::contract(
                stage.as_str(),
                format!("response does not match {}: {e}", T::type_name()),
            )
        })
    }
}

#[async_trait]
impl DesignGenerator for LlmGenerator {
    async fn validate(
        &self,
        brand: &BrandIdentity,
        campaign: &CampaignBrief,
    ) -> Result<Vec<String>, ForgeError> {
        let request = JsonRequest::for_type::<ValidationResponse>(
            prompts::validation_system_prompt(),
            prompts::validation_user_prompt(brand, campaign)?,
        );
        let response: ValidationResponse = self.call(Stage::Validate, request).await?;
        Ok(response.check())
    }

    async fn strategize(&self, brief: &Brief) -> Result<StrategyOutcome, ForgeError> {
        let request = JsonRequest::for_type::<StrategyResponse>(
            prompts::STRATEGY_SYSTEM_PROMPT,
            prompts::strategy_user_prompt(&brief.brand, &brief.campaign, &brief.assets)?,
        );
        let response: StrategyResponse = self.call(Stage::Strategize, request).await?;
        response.check()
    }

    async fn draft(
        &self,
        brief: &Brief,
        concept: &ConceptVariant,
    ) -> Result<DraftOutcome, ForgeError> {
        let request = JsonRequest::for_type::<DraftResponse>(
            prompts::DRAFT_SYSTEM_PROMPT,
            prompts::draft_user_prompt(&brief.brand, &brief.campaign, &brief.assets, concept)?,
        )
        .thinking_budget(self.draft_thinking_budget);
        let response: DraftResponse = self.call(Stage::Draft, request).await?;
        response.check(brief.campaign.output_format)
    }

    async fn audit_and_revise(
        &self,
        brief: &Brief,
        artifact: &DesignArtifact,
        iteration: u32,
    ) -> Result<AuditOutcome, ForgeError> {
        let request = JsonRequest::for_type::<AuditResponse>(
            prompts::AUDIT_SYSTEM_PROMPT,
            prompts::audit_user_prompt(&brief.brand, &brief.campaign, artifact, iteration)?,
        );
        let response: AuditResponse = self.call(Stage::Audit, request).await?;
        response.check(iteration, brief.campaign.output_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture_design_json, RecordingAgent};
    use flyerforge_common::defaults::sample_brief;
    use flyerforge_common::ConceptId;
    use serde_json::json;

    fn concept() -> ConceptVariant {
        ConceptVariant {
            id: ConceptId::A,
            title: "Mezze Mosaic".to_string(),
            description: "Tiled dishes".to_string(),
            layout_direction: "Grid of plates".to_string(),
        }
    }

    #[tokio::test]
    async fn validate_returns_questions() {
        let agent = Arc::new(
            RecordingAgent::new().respond("ValidationResponse", json!({ "questions": ["Which platform?"] })),
        );
        let generator = LlmGenerator::new(agent.clone());
        let brief = sample_brief();

        let questions = generator.validate(&brief.brand, &brief.campaign).await.unwrap();
        assert_eq!(questions, vec!["Which platform?".to_string()]);

        let requests = agent.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].user.contains("Order Catering Now"));
        assert_eq!(requests[0].options.thinking_budget, None);
    }

    #[tokio::test]
    async fn draft_sets_thinking_budget() {
        let agent = Arc::new(RecordingAgent::new().respond(
            "DraftResponse",
            json!({ "design_json": fixture_design_json(), "svg_code": "<svg/>", "production_notes": "CMYK" }),
        ));
        let generator = LlmGenerator::new(agent.clone()).with_draft_thinking_budget(4096);

        let outcome = generator.draft(&sample_brief(), &concept()).await.unwrap();
        assert_eq!(outcome.production_notes, "CMYK");
        assert_eq!(agent.requests()[0].options.thinking_budget, Some(4096));
    }

    #[tokio::test]
    async fn transport_failure_is_transport_error() {
        let agent = Arc::new(RecordingAgent::new());
        let generator = LlmGenerator::new(agent);

        let err = generator.strategize(&sample_brief()).await.unwrap_err();
        assert!(matches!(err, ForgeError::Transport { stage: "strategize", .. }), "{err}");
    }

    #[tokio::test]
    async fn wrong_shape_is_contract_violation() {
        let agent = Arc::new(
            RecordingAgent::new().respond("StrategyResponse", json!({ "strategy": "one bullet" })),
        );
        let generator = LlmGenerator::new(agent);

        let err = generator.strategize(&sample_brief()).await.unwrap_err();
        assert!(matches!(err, ForgeError::ContractViolation { stage: "strategize", .. }), "{err}");
    }

    #[tokio::test]
    async fn drafted_artifact_audits_into_valid_revision() {
        let mut revised = fixture_design_json();
        revised["layers"][0]["fill"] = json!("#F9F7F2");
        let agent = Arc::new(
            RecordingAgent::new()
                .respond(
                    "DraftResponse",
                    json!({ "design_json": fixture_design_json(), "svg_code": "<svg><rect/></svg>" }),
                )
                .respond(
                    "AuditResponse",
                    json!({
                        "score": 91,
                        "issues": ["CTA contrast below 4.5:1"],
                        "fixes_applied": ["Darkened CTA band"],
                        "is_perfect": false,
                        "revised_design_json": revised,
                        "revised_svg_code": "<svg><rect fill=\"#F9F7F2\"/></svg>"
                    }),
                ),
        );
        let generator = LlmGenerator::new(agent.clone());
        let brief = sample_brief();

        let draft = generator.draft(&brief, &concept()).await.unwrap();
        let audit = generator.audit_and_revise(&brief, &draft.artifact, 1).await.unwrap();

        assert!(audit.artifact.spec.problems().is_empty());
        assert_eq!(audit.report.iteration, 1);
        assert_eq!(audit.report.score, 91);
        assert_ne!(audit.artifact, draft.artifact);
        assert!(agent.requests()[1].user.contains("QA iteration #1"));
    }

    #[tokio::test]
    async fn draft_without_markup_is_contract_violation() {
        let agent = Arc::new(RecordingAgent::new().respond(
            "DraftResponse",
            json!({ "design_json": fixture_design_json(), "svg_code": "", "production_notes": "" }),
        ));
        let generator = LlmGenerator::new(agent.clone());

        let err = generator.draft(&sample_brief(), &concept()).await.unwrap_err();
        assert!(matches!(err, ForgeError::ContractViolation { stage: "draft", .. }), "{err}");

        let schema = &agent.requests()[0].schema;
        assert!(schema["required"]
            .as_array()
            .unwrap()
            .contains(&json!("svg_code")));
    }
}
