use std::collections::{BTreeMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentSpec {
    /// e.g. "letter", "A4", "1080x1920"
    pub size: String,
    pub orientation: String,
    /// "in", "mm" or "px"
    pub units: String,
    pub dpi: u32,
    pub bleed: f64,
    pub safe_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GridSpec {
    pub columns: u32,
    pub gutter: f64,
    pub baseline: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DesignTokens {
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default)]
    pub type_scale: BTreeMap<String, f64>,
    #[serde(default)]
    pub spacing_scale: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Rect,
    Image,
    Text,
    Logo,
    Qr,
    Shape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One visual layer, back to front in `DesignSpec::layers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Layer {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssetSlots {
    pub logo_slot: String,
    #[serde(default)]
    pub photo_slots: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_slot: Option<String>,
}

/// Structured description of a flyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DesignSpec {
    pub document: DocumentSpec,
    pub grid: GridSpec,
    pub tokens: DesignTokens,
    pub layers: Vec<Layer>,
    pub asset_slots: AssetSlots,
}

impl DesignSpec {
    /// Structural problems serde cannot express. Empty means valid.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.document.size.trim().is_empty() {
            problems.push("document.size is empty".to_string());
        }
        if self.document.units.trim().is_empty() {
            problems.push("document.units is empty".to_string());
        }
        if self.document.dpi == 0 {
            problems.push("document.dpi must be positive".to_string());
        }
        if self.document.bleed < 0.0 || self.document.safe_margin < 0.0 {
            problems.push("document bleed and safe_margin must be non-negative".to_string());
        }
        if self.grid.columns == 0 {
            problems.push("grid.columns must be positive".to_string());
        }

        let mut seen = HashSet::new();
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.id.trim().is_empty() {
                problems.push(format!("layers[{i}] has an empty id"));
            } else if !seen.insert(layer.id.as_str()) {
                problems.push(format!("layer id {:?} is duplicated", layer.id));
            }
            if layer.w < 0.0 || layer.h < 0.0 {
                problems.push(format!("layer {:?} has negative size", layer.id));
            }
        }

        problems
    }
}

/// A design spec paired with its rendered markup. Superseded, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignArtifact {
    pub spec: DesignSpec,
    /// Self-contained SVG or HTML; empty for structured-data-only output.
    pub markup: String,
}

impl DesignArtifact {
    pub fn new(spec: DesignSpec, markup: impl Into<String>) -> Self {
        Self {
            spec,
            markup: markup.into(),
        }
    }

    /// Document size and resolution, e.g. "letter @ 300DPI".
    pub fn summary(&self) -> String {
        format!("{} @ {}DPI", self.spec.document.size, self.spec.document.dpi)
    }

    /// Markup references that would make the artifact depend on outside files.
    pub fn external_references(&self) -> Vec<String> {
        let mut refs = Vec::new();
        for attr in ["href=\"http", "href='http", "src=\"http", "src='http", "url(http"] {
            let mut rest = self.markup.as_str();
            while let Some(pos) = rest.find(attr) {
                let tail = &rest[pos..];
                let end = tail
                    .find(|c: char| c == ' ' || c == '>' || c == ')')
                    .unwrap_or(tail.len());
                refs.push(tail[..end].to_string());
                rest = &tail[end..];
            }
        }
        refs
    }
}
