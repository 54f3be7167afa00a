// Test doubles for the forge pipeline.
//
// Two fakes matching the two seams:
// - ScriptedGenerator (DesignGenerator): in-memory stages with call counters,
//   scripted audit scores, injected failures and one-shot pauses
// - RecordingAgent (ai_client::JsonAgent): canned JSON per response schema,
//   records every request it receives
//
// Plus fixture builders for designs, concepts and reports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use ai_client::{JsonAgent, JsonRequest};
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use flyerforge_common::{
    Brief, BrandIdentity, CampaignBrief, ConceptId, ConceptVariant, DesignArtifact, DesignSpec,
    ForgeError, QualityReport, WinnerSelection,
};

use crate::generator::{AuditOutcome, DesignGenerator, DraftOutcome, Stage, StrategyOutcome};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A structurally valid letter-size design as the service would return it.
pub fn fixture_design_json() -> serde_json::Value {
    json!({
        "document": { "size": "letter", "orientation": "portrait", "units": "in", "dpi": 300, "bleed": 0.125, "safe_margin": 0.25 },
        "grid": { "columns": 12, "gutter": 0.1667, "baseline": 0.125 },
        "tokens": {
            "colors": { "primary": "#3C9357", "secondary": "#670E20", "background": "#F9F7F2" },
            "type_scale": { "h1": 54.0, "body": 11.0 },
            "spacing_scale": { "sm": 0.125, "md": 0.25 }
        },
        "layers": [
            { "id": "bg", "type": "rect", "x": -0.125, "y": -0.125, "w": 8.75, "h": 11.25, "fill": "#F9F7F2" },
            { "id": "headline", "type": "text", "x": 0.5, "y": 1.0, "w": 7.5, "h": 1.4, "text": "Celebrate with Mediterranean Flavor", "font": "DM Serif Display", "size": 54.0, "align": "center" },
            { "id": "cta", "type": "shape", "x": 2.0, "y": 9.0, "w": 4.5, "h": 0.8, "fill": "#3C9357" },
            { "id": "logo", "type": "logo", "x": 3.5, "y": 10.1, "w": 1.5, "h": 0.6 }
        ],
        "asset_slots": { "logo_slot": "logo", "photo_slots": [] }
    })
}

pub fn fixture_spec() -> DesignSpec {
    serde_json::from_value(fixture_design_json()).expect("fixture design is valid")
}

/// Fixture artifact whose markup carries `tag`, so revisions are told apart.
pub fn fixture_artifact(tag: &str) -> DesignArtifact {
    DesignArtifact::new(
        fixture_spec(),
        format!("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 2550 3300\"><!-- {tag} --></svg>"),
    )
}

pub fn fixture_concepts() -> Vec<ConceptVariant> {
    ConceptId::ALL
        .iter()
        .map(|&id| ConceptVariant {
            id,
            title: format!("Concept {id}"),
            description: format!("Direction {id}"),
            layout_direction: "Hero image top, CTA band bottom".to_string(),
        })
        .collect()
}

pub fn fixture_strategy(winner: &str) -> StrategyOutcome {
    StrategyOutcome {
        strategy: vec![
            "Lead with the catering offer".to_string(),
            "Warm, appetising palette".to_string(),
        ],
        image_prompts: vec!["Overhead mezze platter on linen, natural light".to_string()],
        concepts: fixture_concepts(),
        winner: WinnerSelection {
            id: winner.to_string(),
            rationale: "Strongest CTA hierarchy".to_string(),
        },
    }
}

pub fn report(iteration: u32, score: u8, is_perfect: bool) -> QualityReport {
    QualityReport {
        score,
        issues: if is_perfect {
            Vec::new()
        } else {
            vec!["CTA contrast below 4.5:1".to_string()]
        },
        fixes_applied: vec![format!("Round {iteration} fixes")],
        iteration,
        is_perfect,
    }
}

// ---------------------------------------------------------------------------
// Pause
// ---------------------------------------------------------------------------

/// One-shot gate inside a scripted stage. The first call to the stage
/// signals `entered` and then waits for `release`; later calls pass through.
pub struct Pause {
    pub entered: Notify,
    pub release: Notify,
    armed: AtomicBool,
}

impl Pause {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Notify::new(),
            armed: AtomicBool::new(true),
        })
    }

    async fn hold(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

/// In-memory `DesignGenerator`.
///
/// By default it asks one question per blank required field (like the real
/// service), picks concept A, and scores every audit 96.
/// Builder methods: `.with_questions()`, `.with_winner()`, `.with_scores()`,
/// `.with_audits()`, `.failing_at()`, `.pause_at()`.
pub struct ScriptedGenerator {
    questions: Option<Vec<String>>,
    winner: String,
    audits: Vec<(u8, bool)>,
    fail_at: Option<Stage>,
    pauses: HashMap<Stage, Arc<Pause>>,
    calls: Mutex<Vec<Stage>>,
    audited: Mutex<Vec<(u32, DesignArtifact)>>,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            questions: None,
            winner: "A".to_string(),
            audits: vec![(96, false)],
            fail_at: None,
            pauses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            audited: Mutex::new(Vec::new()),
        }
    }

    /// Fixed questions instead of the required-field check.
    pub fn with_questions(mut self, questions: Vec<String>) -> Self {
        self.questions = Some(questions);
        self
    }

    pub fn with_winner(mut self, id: &str) -> Self {
        self.winner = id.to_string();
        self
    }

    /// Audit scores per round, never perfect. The last score repeats.
    pub fn with_scores(mut self, scores: &[u8]) -> Self {
        self.audits = scores.iter().map(|&s| (s, false)).collect();
        self
    }

    /// `(score, is_perfect)` per round. The last entry repeats.
    pub fn with_audits(mut self, audits: Vec<(u8, bool)>) -> Self {
        self.audits = audits;
        self
    }

    /// Fail the given stage with a transport error.
    pub fn failing_at(mut self, stage: Stage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    pub fn pause_at(mut self, stage: Stage, pause: Arc<Pause>) -> Self {
        self.pauses.insert(stage, pause);
        self
    }

    pub fn calls(&self, stage: Stage) -> usize {
        self.calls.lock().unwrap().iter().filter(|s| **s == stage).count()
    }

    pub fn call_log(&self) -> Vec<Stage> {
        self.calls.lock().unwrap().clone()
    }

    /// Artifacts passed to `audit_and_revise`, with their iteration numbers.
    pub fn audited(&self) -> Vec<(u32, DesignArtifact)> {
        self.audited.lock().unwrap().clone()
    }

    async fn enter(&self, stage: Stage) -> Result<(), ForgeError> {
        self.calls.lock().unwrap().push(stage);
        if let Some(pause) = self.pauses.get(&stage) {
            pause.hold().await;
        }
        if self.fail_at == Some(stage) {
            return Err(ForgeError::transport(
                stage.as_str(),
                anyhow::anyhow!("scripted failure at {stage}"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DesignGenerator for ScriptedGenerator {
    async fn validate(
        &self,
        _brand: &BrandIdentity,
        campaign: &CampaignBrief,
    ) -> Result<Vec<String>, ForgeError> {
        self.enter(Stage::Validate).await?;
        Ok(match &self.questions {
            Some(questions) => questions.clone(),
            None => campaign
                .missing_required_fields()
                .into_iter()
                .map(|field| format!("Please provide {field}."))
                .collect(),
        })
    }

    async fn strategize(&self, _brief: &Brief) -> Result<StrategyOutcome, ForgeError> {
        self.enter(Stage::Strategize).await?;
        Ok(fixture_strategy(&self.winner))
    }

    async fn draft(
        &self,
        _brief: &Brief,
        concept: &ConceptVariant,
    ) -> Result<DraftOutcome, ForgeError> {
        self.enter(Stage::Draft).await?;
        Ok(DraftOutcome {
            artifact: fixture_artifact(&format!("draft {}", concept.id)),
            production_notes: "Export PDF/X-1a, 300 dpi, 0.125in bleed".to_string(),
        })
    }

    async fn audit_and_revise(
        &self,
        _brief: &Brief,
        artifact: &DesignArtifact,
        iteration: u32,
    ) -> Result<AuditOutcome, ForgeError> {
        self.enter(Stage::Audit).await?;
        self.audited
            .lock()
            .unwrap()
            .push((iteration, artifact.clone()));

        let index = (iteration as usize).saturating_sub(1);
        let (score, is_perfect) = self
            .audits
            .get(index)
            .or_else(|| self.audits.last())
            .copied()
            .unwrap_or((0, false));

        Ok(AuditOutcome {
            report: report(iteration, score, is_perfect),
            artifact: fixture_artifact(&format!("round {iteration}")),
            production_notes: Some(format!("Notes after round {iteration}")),
        })
    }
}

// ---------------------------------------------------------------------------
// RecordingAgent
// ---------------------------------------------------------------------------

/// `JsonAgent` that answers from canned JSON keyed by response schema name.
/// Returns `Err` for schemas with no registered response.
pub struct RecordingAgent {
    responses: HashMap<String, serde_json::Value>,
    requests: Mutex<Vec<JsonRequest>>,
}

impl Default for RecordingAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingAgent {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(mut self, schema_name: &str, value: serde_json::Value) -> Self {
        self.responses.insert(schema_name.to_string(), value);
        self
    }

    pub fn requests(&self) -> Vec<JsonRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl JsonAgent for RecordingAgent {
    fn provider(&self) -> &'static str {
        "Recording"
    }

    fn model(&self) -> &str {
        "recording-1"
    }

    async fn extract_value(&self, request: JsonRequest) -> Result<serde_json::Value> {
        let name = request.schema_name.clone();
        self.requests.lock().unwrap().push(request);
        match self.responses.get(&name) {
            Some(value) => Ok(value.clone()),
            None => bail!("RecordingAgent: no response registered for {name}"),
        }
    }
}
