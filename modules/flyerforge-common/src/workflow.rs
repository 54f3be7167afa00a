use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::design::DesignArtifact;
use crate::quality::QualityReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum ConceptId {
    A,
    B,
    C,
}

impl ConceptId {
    pub const ALL: [ConceptId; 3] = [ConceptId::A, ConceptId::B, ConceptId::C];
}

impl std::str::FromStr for ConceptId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(ConceptId::A),
            "B" => Ok(ConceptId::B),
            "C" => Ok(ConceptId::C),
            other => Err(format!("unknown concept id {other:?}")),
        }
    }
}

impl std::fmt::Display for ConceptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConceptId::A => write!(f, "A"),
            ConceptId::B => write!(f, "B"),
            ConceptId::C => write!(f, "C"),
        }
    }
}

/// One of the three creative directions proposed before drafting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConceptVariant {
    pub id: ConceptId,
    pub title: String,
    #[serde(alias = "desc")]
    pub description: String,
    pub layout_direction: String,
}

/// The service's pick. The id is kept as returned and resolved against the
/// concept list only when drafting starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WinnerSelection {
    pub id: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub artifact: DesignArtifact,
    pub report: QualityReport,
}

/// Everything a run has produced so far.
///
/// Updates consume the state and return the next one, so a snapshot handed
/// out earlier never changes underneath its holder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub strategy: Vec<String>,
    pub concepts: Vec<ConceptVariant>,
    pub winner: Option<WinnerSelection>,
    pub image_prompts: Vec<String>,
    pub production_notes: Option<String>,
    pub history: Vec<HistoryEntry>,
}

impl WorkflowState {
    pub fn with_strategy(
        self,
        strategy: Vec<String>,
        concepts: Vec<ConceptVariant>,
        winner: WinnerSelection,
        image_prompts: Vec<String>,
    ) -> Self {
        Self {
            strategy,
            concepts,
            winner: Some(winner),
            image_prompts,
            ..self
        }
    }

    /// Start the history with the draft and its placeholder report.
    pub fn with_draft(self, artifact: DesignArtifact, production_notes: String) -> Self {
        Self {
            production_notes: Some(production_notes),
            history: vec![HistoryEntry {
                artifact,
                report: QualityReport::placeholder(),
            }],
            ..self
        }
    }

    /// Append a revision. Blank notes keep the previous ones.
    pub fn with_revision(
        mut self,
        artifact: DesignArtifact,
        report: QualityReport,
        production_notes: Option<String>,
    ) -> Self {
        if let Some(notes) = production_notes.filter(|n| !n.trim().is_empty()) {
            self.production_notes = Some(notes);
        }
        self.history.push(HistoryEntry { artifact, report });
        self
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    pub fn winning_concept(&self) -> Option<&ConceptVariant> {
        let id: ConceptId = self.winner.as_ref()?.id.parse().ok()?;
        self.concepts.iter().find(|c| c.id == id)
    }

    /// Number of completed revision rounds.
    pub fn revision_count(&self) -> usize {
        self.history.iter().filter(|h| !h.report.is_placeholder()).count()
    }

    /// Revision reports, newest first, without the draft placeholder.
    pub fn audit_timeline(&self) -> Vec<&QualityReport> {
        self.history
            .iter()
            .rev()
            .map(|h| &h.report)
            .filter(|r| !r.is_placeholder())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.strategy.is_empty()
            && self.concepts.is_empty()
            && self.winner.is_none()
            && self.image_prompts.is_empty()
            && self.production_notes.is_none()
            && self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{AssetSlots, DesignSpec, DesignTokens, DocumentSpec, GridSpec};

    fn artifact(tag: &str) -> DesignArtifact {
        DesignArtifact::new(
            DesignSpec {
                document: DocumentSpec {
                    size: "letter".to_string(),
                    orientation: "portrait".to_string(),
                    units: "in".to_string(),
                    dpi: 300,
                    bleed: 0.125,
                    safe_margin: 0.25,
                },
                grid: GridSpec {
                    columns: 12,
                    gutter: 0.2,
                    baseline: 0.125,
                },
                tokens: DesignTokens::default(),
                layers: Vec::new(),
                asset_slots: AssetSlots::default(),
            },
            format!("<svg><!-- {tag} --></svg>"),
        )
    }

    fn report(iteration: u32, score: u8) -> QualityReport {
        QualityReport {
            score,
            issues: Vec::new(),
            fixes_applied: Vec::new(),
            iteration,
            is_perfect: false,
        }
    }

    fn concept(id: ConceptId) -> ConceptVariant {
        ConceptVariant {
            id,
            title: format!("Concept {id}"),
            description: String::new(),
            layout_direction: String::new(),
        }
    }

    #[test]
    fn updates_leave_earlier_snapshots_untouched() {
        let empty = WorkflowState::default();
        let drafted = empty
            .clone()
            .with_draft(artifact("draft"), "notes v0".to_string());
        let revised = drafted
            .clone()
            .with_revision(artifact("r1"), report(1, 80), None);

        assert!(empty.is_empty());
        assert_eq!(drafted.history.len(), 1);
        assert_eq!(revised.history.len(), 2);
        assert_eq!(revised.production_notes.as_deref(), Some("notes v0"));
    }

    #[test]
    fn revision_notes_replace_only_when_present() {
        let state = WorkflowState::default()
            .with_draft(artifact("draft"), "v0".to_string())
            .with_revision(artifact("r1"), report(1, 70), Some("  ".to_string()))
            .with_revision(artifact("r2"), report(2, 90), Some("v2".to_string()));
        assert_eq!(state.production_notes.as_deref(), Some("v2"));
    }

    #[test]
    fn audit_timeline_is_newest_first_without_placeholder() {
        let state = WorkflowState::default()
            .with_draft(artifact("draft"), String::new())
            .with_revision(artifact("r1"), report(1, 70), None)
            .with_revision(artifact("r2"), report(2, 88), None);

        let scores: Vec<u8> = state.audit_timeline().iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![88, 70]);
        assert_eq!(state.revision_count(), 2);
        assert!(state.latest().unwrap().artifact.markup.contains("r2"));
    }

    #[test]
    fn winning_concept_resolves_by_id() {
        let state = WorkflowState::default().with_strategy(
            vec!["Lead with the offer".to_string()],
            ConceptId::ALL.iter().copied().map(concept).collect(),
            WinnerSelection {
                id: "B".to_string(),
                rationale: "Strongest CTA hierarchy".to_string(),
            },
            Vec::new(),
        );
        assert_eq!(state.winning_concept().unwrap().title, "Concept B");
    }

    #[test]
    fn unknown_winner_resolves_to_nothing() {
        let state = WorkflowState::default().with_strategy(
            Vec::new(),
            ConceptId::ALL.iter().copied().map(concept).collect(),
            WinnerSelection {
                id: "D".to_string(),
                rationale: String::new(),
            },
            Vec::new(),
        );
        assert!(state.winning_concept().is_none());
    }

    #[test]
    fn winner_id_must_match_exactly() {
        for id in ["b", " B", "B "] {
            let state = WorkflowState::default().with_strategy(
                Vec::new(),
                ConceptId::ALL.iter().copied().map(concept).collect(),
                WinnerSelection {
                    id: id.to_string(),
                    rationale: String::new(),
                },
                Vec::new(),
            );
            assert!(state.winning_concept().is_none(), "{id:?}");
        }
        assert!("c".parse::<ConceptId>().is_err());
    }

    #[test]
    fn concept_accepts_desc_alias() {
        let concept: ConceptVariant = serde_json::from_value(serde_json::json!({
            "id": "C",
            "title": "Rustic Table",
            "desc": "Overhead spread",
            "layout_direction": "Full-bleed photo with lower third"
        }))
        .unwrap();
        assert_eq!(concept.id, ConceptId::C);
        assert_eq!(concept.description, "Overhead spread");
    }
}
