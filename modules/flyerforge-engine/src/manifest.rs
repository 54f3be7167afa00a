//! Production manifest and on-disk export of a finished run.
//!
//! Each export lands in its own `{root}/{run_id}/` directory holding the final
//! markup, the final design JSON, the full revision history and the manifest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use flyerforge_common::{ForgeError, OutputFormat, WorkflowState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestWinner {
    pub id: String,
    pub title: String,
    pub rationale: String,
}

/// Hand-off summary for the print shop or social team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionManifest {
    pub run_id: Uuid,
    pub document_size: String,
    pub orientation: String,
    pub dpi: u32,
    pub bleed: f64,
    pub safe_margin: f64,
    pub units: String,
    pub color_tokens: BTreeMap<String, String>,
    pub production_notes: String,
    /// Score of the last revision; `None` when no QA round ran.
    pub final_score: Option<u8>,
    pub is_perfect: bool,
    pub revision_count: usize,
    pub winner: Option<ManifestWinner>,
    pub image_prompts: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl ProductionManifest {
    /// `None` until the run has a drafted artifact.
    pub fn from_state(run_id: Uuid, state: &WorkflowState) -> Option<Self> {
        let latest = state.latest()?;
        let document = &latest.artifact.spec.document;
        let last_report = state.audit_timeline().first().copied();

        let winner = state.winner.as_ref().map(|w| ManifestWinner {
            id: w.id.clone(),
            title: state
                .winning_concept()
                .map(|c| c.title.clone())
                .unwrap_or_default(),
            rationale: w.rationale.clone(),
        });

        Some(Self {
            run_id,
            document_size: document.size.clone(),
            orientation: document.orientation.clone(),
            dpi: document.dpi,
            bleed: document.bleed,
            safe_margin: document.safe_margin,
            units: document.units.clone(),
            color_tokens: latest.artifact.spec.tokens.colors.clone(),
            production_notes: state.production_notes.clone().unwrap_or_default(),
            final_score: last_report.map(|r| r.score),
            is_perfect: last_report.is_some_and(|r| r.is_perfect),
            revision_count: state.revision_count(),
            winner,
            image_prompts: state.image_prompts.clone(),
            generated_at: Utc::now(),
        })
    }
}

/// Files written by [`export_run`].
#[derive(Debug, Clone)]
pub struct RunExport {
    pub dir: PathBuf,
    pub markup: Option<PathBuf>,
    pub design: PathBuf,
    pub history: PathBuf,
    pub manifest: PathBuf,
}

/// Write the final artifact, history and manifest under `root/{run_id}/`.
pub async fn export_run(
    root: &Path,
    run_id: Uuid,
    state: &WorkflowState,
    format: Option<OutputFormat>,
) -> Result<RunExport, ForgeError> {
    let (Some(latest), Some(manifest)) =
        (state.latest(), ProductionManifest::from_state(run_id, state))
    else {
        return Err(ForgeError::Export("run has no drafted design".to_string()));
    };

    let dir = root.join(run_id.to_string());
    tokio::fs::create_dir_all(&dir).await?;

    let extension = format.unwrap_or(OutputFormat::Svg).markup_extension();
    let markup = match extension {
        Some(ext) if !latest.artifact.markup.is_empty() => {
            let path = dir.join(format!("flyer.{ext}"));
            tokio::fs::write(&path, &latest.artifact.markup).await?;
            Some(path)
        }
        _ => None,
    };

    let design = dir.join("design.json");
    tokio::fs::write(&design, serde_json::to_vec_pretty(&latest.artifact.spec)?).await?;

    let history = dir.join("history.json");
    tokio::fs::write(&history, serde_json::to_vec_pretty(&state.history)?).await?;

    let manifest_path = dir.join("manifest.json");
    tokio::fs::write(&manifest_path, serde_json::to_vec_pretty(&manifest)?).await?;

    info!(
        run_id = %run_id,
        dir = %dir.display(),
        revisions = manifest.revision_count,
        "Run exported"
    );

    Ok(RunExport {
        dir,
        markup,
        design,
        history,
        manifest: manifest_path,
    })
}
