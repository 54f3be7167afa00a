// The four generation stages and the response contracts they decode into.
//
// DesignGenerator is the seam between the orchestrator and the hosted model:
// LlmGenerator implements it over ai-client, ScriptedGenerator (testing.rs)
// implements it in memory. Wire responses are decoded with serde and then
// checked before any field reaches WorkflowState.

use std::collections::HashSet;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use flyerforge_common::{
    Brief, BrandIdentity, CampaignBrief, ConceptId, ConceptVariant, DesignArtifact, DesignSpec,
    ForgeError, OutputFormat, QualityReport, WinnerSelection, MAX_SCORE,
};

/// Upper bound on clarifying questions surfaced to the user.
pub const MAX_QUESTIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validate,
    Strategize,
    Draft,
    Audit,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::Strategize => "strategize",
            Stage::Draft => "draft",
            Stage::Audit => "audit",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DesignGenerator
// ---------------------------------------------------------------------------

#[async_trait]
pub trait DesignGenerator: Send + Sync {
    /// Clarifying questions about the campaign. Empty means the brief is
    /// complete enough to proceed.
    async fn validate(
        &self,
        brand: &BrandIdentity,
        campaign: &CampaignBrief,
    ) -> Result<Vec<String>, ForgeError>;

    /// Strategy bullets, three concept variants and the service's pick.
    async fn strategize(&self, brief: &Brief) -> Result<StrategyOutcome, ForgeError>;

    /// Full design for one concept.
    async fn draft(
        &self,
        brief: &Brief,
        concept: &ConceptVariant,
    ) -> Result<DraftOutcome, ForgeError>;

    /// Score `artifact` and return a revised version. `iteration` starts at 1.
    async fn audit_and_revise(
        &self,
        brief: &Brief,
        artifact: &DesignArtifact,
        iteration: u32,
    ) -> Result<AuditOutcome, ForgeError>;
}

// ---------------------------------------------------------------------------
// Checked outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome {
    pub strategy: Vec<String>,
    pub image_prompts: Vec<String>,
    pub concepts: Vec<ConceptVariant>,
    pub winner: WinnerSelection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftOutcome {
    pub artifact: DesignArtifact,
    pub production_notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditOutcome {
    pub report: QualityReport,
    pub artifact: DesignArtifact,
    /// `None` keeps the notes from the previous stage.
    pub production_notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Wire responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ValidationResponse {
    /// Clarifying questions for the user, at most eight. Empty when the brief
    /// is production-ready.
    #[serde(default)]
    pub questions: Vec<String>,
}

impl ValidationResponse {
    pub fn check(self) -> Vec<String> {
        let mut questions: Vec<String> = self
            .questions
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();
        if questions.len() > MAX_QUESTIONS {
            warn!(count = questions.len(), "Service returned too many questions, keeping the first {MAX_QUESTIONS}");
            questions.truncate(MAX_QUESTIONS);
        }
        questions
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct StrategyResponse {
    /// Short creative strategy bullets.
    pub strategy: Vec<String>,
    /// Image-generation prompts; expected when no photos were supplied.
    #[serde(default)]
    pub image_prompts: Vec<String>,
    /// Exactly three concept variants with ids A, B and C.
    pub concepts: Vec<ConceptVariant>,
    pub winner_selection: WinnerSelection,
}

impl StrategyResponse {
    pub fn check(self) -> Result<StrategyOutcome, ForgeError> {
        let stage = Stage::Strategize.as_str();

        if self.concepts.len() != ConceptId::ALL.len() {
            return Err(ForgeError::contract(
                stage,
                format!("expected 3 concepts, got {}", self.concepts.len()),
            ));
        }
        let ids: HashSet<ConceptId> = self.concepts.iter().map(|c| c.id).collect();
        if ids.len() != ConceptId::ALL.len() {
            return Err(ForgeError::contract(stage, "concept ids must be distinct A, B, C"));
        }
        if self.strategy.iter().all(|s| s.trim().is_empty()) {
            return Err(ForgeError::contract(stage, "strategy is empty"));
        }

        // The winner id is resolved when drafting starts.
        Ok(StrategyOutcome {
            strategy: self.strategy,
            image_prompts: self.image_prompts,
            concepts: self.concepts,
            winner: self.winner_selection,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct DraftResponse {
    pub design_json: DesignSpec,
    /// Self-contained SVG, or HTML for html_css output. Empty for json_only.
    pub svg_code: String,
    /// Export settings and resolution guidance.
    #[serde(default)]
    pub production_notes: String,
}

impl DraftResponse {
    pub fn check(self, format: Option<OutputFormat>) -> Result<DraftOutcome, ForgeError> {
        let artifact = checked_artifact(Stage::Draft, format, self.design_json, self.svg_code)?;
        Ok(DraftOutcome {
            artifact,
            production_notes: self.production_notes,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct AuditResponse {
    /// Integer quality score from 0 to 100.
    pub score: i64,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub fixes_applied: Vec<String>,
    /// Set when no further revision is needed, whatever the score.
    pub is_perfect: bool,
    pub revised_design_json: DesignSpec,
    /// Revised markup in the same format as the audited one.
    pub revised_svg_code: String,
    #[serde(default)]
    pub production_notes: Option<String>,
}

impl AuditResponse {
    pub fn check(
        self,
        iteration: u32,
        format: Option<OutputFormat>,
    ) -> Result<AuditOutcome, ForgeError> {
        let stage = Stage::Audit.as_str();
        let score = u8::try_from(self.score)
            .ok()
            .filter(|s| *s <= MAX_SCORE)
            .ok_or_else(|| {
                ForgeError::contract(stage, format!("score {} is outside 0-100", self.score))
            })?;

        let artifact = checked_artifact(
            Stage::Audit,
            format,
            self.revised_design_json,
            self.revised_svg_code,
        )?;

        Ok(AuditOutcome {
            report: QualityReport {
                score,
                issues: self.issues,
                fixes_applied: self.fixes_applied,
                iteration,
                is_perfect: self.is_perfect,
            },
            artifact,
            production_notes: self.production_notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// Markup may only be blank for json_only output. A missing format means SVG.
fn checked_artifact(
    stage: Stage,
    format: Option<OutputFormat>,
    spec: DesignSpec,
    markup: String,
) -> Result<DesignArtifact, ForgeError> {
    let problems = spec.problems();
    if !problems.is_empty() {
        return Err(ForgeError::contract(
            stage.as_str(),
            format!("invalid design: {}", problems.join("; ")),
        ));
    }
    if markup.trim().is_empty() && format != Some(OutputFormat::JsonOnly) {
        return Err(ForgeError::contract(
            stage.as_str(),
            format!(
                "markup is empty for {} output",
                format.unwrap_or(OutputFormat::Svg).as_str()
            ),
        ));
    }

    let artifact = DesignArtifact::new(spec, markup);
    let external = artifact.external_references();
    if !external.is_empty() {
        warn!(stage = stage.as_str(), refs = ?external, "Markup references external resources");
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn design() -> serde_json::Value {
        json!({
            "document": { "size": "letter", "orientation": "portrait", "units": "in", "dpi": 300, "bleed": 0.125, "safe_margin": 0.25 },
            "grid": { "columns": 12, "gutter": 0.1667, "baseline": 0.125 },
            "tokens": { "colors": { "primary": "#3C9357" }, "type_scale": {}, "spacing_scale": {} },
            "layers": [{ "id": "bg", "type": "rect", "x": 0, "y": 0, "w": 8.5, "h": 11 }],
            "asset_slots": { "logo_slot": "logo", "photo_slots": [] }
        })
    }

    fn concepts(ids: &[&str]) -> serde_json::Value {
        serde_json::Value::Array(
            ids.iter()
                .map(|id| json!({ "id": id, "title": format!("Concept {id}"), "desc": "d", "layout_direction": "l" }))
                .collect(),
        )
    }

    #[test]
    fn questions_are_trimmed_and_capped() {
        let response = ValidationResponse {
            questions: (0..10).map(|i| format!(" Question {i}? ")).chain([String::from("  ")]).collect(),
        };
        let questions = response.check();
        assert_eq!(questions.len(), MAX_QUESTIONS);
        assert_eq!(questions[0], "Question 0?");
    }

    #[test]
    fn strategy_requires_three_distinct_concepts() {
        let ok: StrategyResponse = serde_json::from_value(json!({
            "strategy": ["Lead with the offer"],
            "concepts": concepts(&["A", "B", "C"]),
            "winner_selection": { "id": "B", "rationale": "Clear CTA" }
        }))
        .unwrap();
        let outcome = ok.check().unwrap();
        assert_eq!(outcome.winner.id, "B");
        assert!(outcome.image_prompts.is_empty());

        let dup: StrategyResponse = serde_json::from_value(json!({
            "strategy": ["x"],
            "concepts": concepts(&["A", "A", "C"]),
            "winner_selection": { "id": "A", "rationale": "" }
        }))
        .unwrap();
        assert!(matches!(dup.check(), Err(ForgeError::ContractViolation { .. })));

        let two: StrategyResponse = serde_json::from_value(json!({
            "strategy": ["x"],
            "concepts": concepts(&["A", "B"]),
            "winner_selection": { "id": "A", "rationale": "" }
        }))
        .unwrap();
        assert!(two.check().unwrap_err().to_string().contains("expected 3 concepts"));
    }

    #[test]
    fn unknown_concept_id_does_not_decode() {
        let result = serde_json::from_value::<StrategyResponse>(json!({
            "strategy": ["x"],
            "concepts": concepts(&["A", "B", "D"]),
            "winner_selection": { "id": "A", "rationale": "" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn draft_rejects_structurally_invalid_design() {
        let mut bad = design();
        bad["document"]["dpi"] = json!(0);
        let response: DraftResponse = serde_json::from_value(json!({
            "design_json": bad,
            "svg_code": "<svg/>",
            "production_notes": ""
        }))
        .unwrap();
        let err = response.check(Some(OutputFormat::Svg)).unwrap_err();
        assert!(err.to_string().contains("dpi"));
    }

    #[test]
    fn audit_score_must_be_in_range() {
        let response = |score: i64| -> AuditResponse {
            serde_json::from_value(json!({
                "score": score,
                "issues": [],
                "fixes_applied": [],
                "is_perfect": false,
                "revised_design_json": design(),
                "revised_svg_code": "<svg/>"
            }))
            .unwrap()
        };

        let svg = Some(OutputFormat::Svg);
        assert!(response(101).check(1, svg).is_err());
        assert!(response(-1).check(1, svg).is_err());

        let outcome = response(100).check(2, svg).unwrap();
        assert_eq!(outcome.report.score, 100);
        assert_eq!(outcome.report.iteration, 2);
        assert_eq!(outcome.production_notes, None);
    }

    #[test]
    fn perfect_flag_is_independent_of_score() {
        let response: AuditResponse = serde_json::from_value(json!({
            "score": 62,
            "is_perfect": true,
            "revised_design_json": design(),
            "revised_svg_code": "<svg/>",
            "production_notes": "Export as PDF/X-1a"
        }))
        .unwrap();
        let outcome = response.check(1, Some(OutputFormat::Svg)).unwrap();
        assert!(outcome.report.is_perfect);
        assert_eq!(outcome.report.score, 62);
        assert_eq!(outcome.production_notes.as_deref(), Some("Export as PDF/X-1a"));
    }

    #[test]
    fn markup_is_a_required_field() {
        let draft = serde_json::from_value::<DraftResponse>(json!({
            "design_json": design(),
            "production_notes": ""
        }));
        assert!(draft.is_err());

        let audit = serde_json::from_value::<AuditResponse>(json!({
            "score": 80,
            "is_perfect": false,
            "revised_design_json": design()
        }));
        assert!(audit.is_err());

        let schema = <DraftResponse as ai_client::StructuredOutput>::strict_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"svg_code"), "{required:?}");
    }

    #[test]
    fn blank_markup_only_passes_for_json_only() {
        let draft = |markup: &str| -> DraftResponse {
            serde_json::from_value(json!({
                "design_json": design(),
                "svg_code": markup,
                "production_notes": ""
            }))
            .unwrap()
        };

        for format in [Some(OutputFormat::Svg), Some(OutputFormat::HtmlCss), None] {
            let err = draft("  ").check(format).unwrap_err();
            assert!(
                matches!(err, ForgeError::ContractViolation { stage: "draft", .. }),
                "{format:?}: {err}"
            );
        }
        let outcome = draft("").check(Some(OutputFormat::JsonOnly)).unwrap();
        assert!(outcome.artifact.markup.is_empty());

        let audit: AuditResponse = serde_json::from_value(json!({
            "score": 80,
            "is_perfect": false,
            "revised_design_json": design(),
            "revised_svg_code": ""
        }))
        .unwrap();
        let err = audit.check(1, Some(OutputFormat::HtmlCss)).unwrap_err();
        assert!(err.to_string().contains("markup is empty for html_css"), "{err}");
    }
}
