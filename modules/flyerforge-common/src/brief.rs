use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ForgeError;

// --- Assets ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetFormat {
    Svg,
    Png,
    #[serde(alias = "jpeg")]
    Jpg,
}

/// Reference to a user-supplied file (logo, photo, product shot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssetRef {
    pub id: String,
    #[serde(rename = "type")]
    pub format: AssetFormat,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssetInventory {
    #[serde(default)]
    pub photos: Vec<AssetRef>,
    #[serde(default)]
    pub product_shots: Vec<AssetRef>,
}

impl AssetInventory {
    /// Without photos the service substitutes placeholders and proposes image prompts.
    pub fn has_photos(&self) -> bool {
        !self.photos.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty() && self.product_shots.is_empty()
    }
}

// --- Brand ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FontPair {
    pub display_font: String,
    pub body_font: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColorPalette {
    pub primary: String,
    pub secondary: String,
    pub white: String,
    /// Page/background tone.
    #[serde(alias = "cream")]
    pub background: String,
    #[serde(default)]
    pub neutrals: Vec<String>,
}

impl ColorPalette {
    /// All colors with a label, in declaration order.
    pub fn entries(&self) -> Vec<(String, &str)> {
        let mut out = vec![
            ("primary".to_string(), self.primary.as_str()),
            ("secondary".to_string(), self.secondary.as_str()),
            ("white".to_string(), self.white.as_str()),
            ("background".to_string(), self.background.as_str()),
        ];
        for (i, n) in self.neutrals.iter().enumerate() {
            out.push((format!("neutrals[{i}]"), n.as_str()));
        }
        out
    }

    /// Labels of entries that are not valid color specifications.
    pub fn invalid_entries(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(_, value)| !is_color_spec(value))
            .map(|(label, value)| format!("{label} = {value:?}"))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BrandIdentity {
    pub brand_name: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub logo_assets: Vec<AssetRef>,
    pub fonts: FontPair,
    pub colors: ColorPalette,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub tone_keywords: Vec<String>,
    #[serde(default)]
    pub aesthetic_keywords: Vec<String>,
    #[serde(default)]
    pub do_not_use: Vec<String>,
    #[serde(default)]
    pub image_style_notes: String,
}

/// Accepts hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), `rgb()/rgba()/hsl()/hsla()`
/// functional notation, and alphabetic keywords such as `white` or `transparent`.
pub fn is_color_spec(value: &str) -> bool {
    let v = value.trim();
    if let Some(hex) = v.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }

    let lower = v.to_ascii_lowercase();
    for func in ["rgba(", "rgb(", "hsla(", "hsl("] {
        if let Some(args) = lower.strip_prefix(func) {
            return match args.strip_suffix(')') {
                Some(inner) => {
                    !inner.trim().is_empty()
                        && inner
                            .chars()
                            .all(|c| c.is_ascii_digit() || " ,.%/-".contains(c) || c == 'd' || c == 'e' || c == 'g')
                }
                None => false,
            };
        }
    }

    !v.is_empty() && v.chars().all(|c| c.is_ascii_alphabetic())
}

// --- Campaign ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    Catering,
    Rewards,
    GiftCards,
    Ordering,
    Seasonal,
    Hiring,
    Location,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    PrintLetter,
    PrintA4,
    InstagramPost,
    InstagramStory,
    FacebookPost,
    WebBanner,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::PrintLetter => write!(f, "print_letter"),
            Platform::PrintA4 => write!(f, "print_a4"),
            Platform::InstagramPost => write!(f, "instagram_post"),
            Platform::InstagramStory => write!(f, "instagram_story"),
            Platform::FacebookPost => write!(f, "facebook_post"),
            Platform::WebBanner => write!(f, "web_banner"),
        }
    }
}

/// Physical constraints a design must respect on a given platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformSpec {
    Print {
        size: &'static str,
        width_in: f32,
        height_in: f32,
        dpi: u32,
        bleed_in: f32,
        safe_margin_in: f32,
    },
    Screen {
        width_px: u32,
        height_px: u32,
        /// Inset kept clear of platform UI chrome.
        safe_zone_px: u32,
    },
}

pub const PRINT_BLEED_IN: f32 = 0.125;
pub const PRINT_SAFE_MARGIN_IN: f32 = 0.25;
pub const PRINT_DPI: u32 = 300;
pub const SOCIAL_WIDTH_PX: u32 = 1080;

impl Platform {
    pub fn spec(self) -> PlatformSpec {
        match self {
            Platform::PrintLetter => PlatformSpec::Print {
                size: "letter",
                width_in: 8.5,
                height_in: 11.0,
                dpi: PRINT_DPI,
                bleed_in: PRINT_BLEED_IN,
                safe_margin_in: PRINT_SAFE_MARGIN_IN,
            },
            Platform::PrintA4 => PlatformSpec::Print {
                size: "A4",
                width_in: 8.27,
                height_in: 11.69,
                dpi: PRINT_DPI,
                bleed_in: PRINT_BLEED_IN,
                safe_margin_in: PRINT_SAFE_MARGIN_IN,
            },
            Platform::InstagramPost | Platform::FacebookPost => PlatformSpec::Screen {
                width_px: SOCIAL_WIDTH_PX,
                height_px: 1080,
                safe_zone_px: 60,
            },
            Platform::InstagramStory => PlatformSpec::Screen {
                width_px: SOCIAL_WIDTH_PX,
                height_px: 1920,
                safe_zone_px: 250,
            },
            Platform::WebBanner => PlatformSpec::Screen {
                width_px: SOCIAL_WIDTH_PX,
                height_px: 360,
                safe_zone_px: 24,
            },
        }
    }
}

impl std::fmt::Display for PlatformSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformSpec::Print {
                size,
                width_in,
                height_in,
                dpi,
                bleed_in,
                safe_margin_in,
            } => write!(
                f,
                "print {size} {width_in}x{height_in}in at {dpi} dpi, {bleed_in}in bleed, {safe_margin_in}in safe margin"
            ),
            PlatformSpec::Screen {
                width_px,
                height_px,
                safe_zone_px,
            } => write!(
                f,
                "screen {width_px}x{height_px}px, keep {safe_zone_px}px safe zone clear of UI overlays"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Svg,
    HtmlCss,
    JsonOnly,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::HtmlCss => "html_css",
            OutputFormat::JsonOnly => "json_only",
        }
    }

    /// File extension for the exported markup, if the format carries any.
    pub fn markup_extension(self) -> Option<&'static str> {
        match self {
            OutputFormat::Svg => Some("svg"),
            OutputFormat::HtmlCss => Some("html"),
            OutputFormat::JsonOnly => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OfferTerms {
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub bundle: String,
    #[serde(default)]
    pub promo_code: String,
    #[serde(default)]
    pub expires_on: String,
    #[serde(default)]
    pub fine_print: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LocationBlock {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub extra: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CampaignBrief {
    pub campaign_type: CampaignType,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub subhead: String,
    #[serde(default)]
    pub body_copy: String,
    #[serde(default)]
    pub offer_details: OfferTerms,
    #[serde(default)]
    pub cta_text: String,
    #[serde(default)]
    pub cta_url_or_qr_target: String,
    #[serde(default)]
    pub location_block: LocationBlock,
    #[serde(default)]
    pub required_elements: Vec<String>,
    #[serde(default)]
    pub target_platforms: Vec<Platform>,
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
    #[serde(default)]
    pub language: String,
}

impl CampaignBrief {
    /// Platform whose physical constraints the draft follows.
    pub fn primary_platform(&self) -> Option<Platform> {
        self.target_platforms.first().copied()
    }

    /// Required fields that are blank. The service makes the final call; this
    /// is for local hints and test stubs.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.target_platforms.is_empty() {
            missing.push("target_platforms");
        }
        if self.cta_text.trim().is_empty() {
            missing.push("cta_text");
        }
        if self.output_format.is_none() {
            missing.push("output_format");
        }
        if self.headline.trim().is_empty() && self.body_copy.trim().is_empty() {
            missing.push("headline or body_copy");
        }
        missing
    }
}

// --- Brief ---

/// Everything the user supplies for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brief {
    pub brand: BrandIdentity,
    pub campaign: CampaignBrief,
    #[serde(default)]
    pub assets: AssetInventory,
}

impl Brief {
    pub fn new(brand: BrandIdentity, campaign: CampaignBrief, assets: AssetInventory) -> Self {
        Self {
            brand,
            campaign,
            assets,
        }
    }

    /// Local integrity checks on user input.
    pub fn check(&self) -> Result<(), ForgeError> {
        let invalid = self.brand.colors.invalid_entries();
        if !invalid.is_empty() {
            return Err(ForgeError::InvalidBrief(format!(
                "invalid brand colors: {}",
                invalid.join(", ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;

    #[test]
    fn color_specs() {
        for ok in ["#fff", "#3C9357", "#3c935780", "rgb(10, 20, 30)", "rgba(0,0,0,0.5)", "hsl(120deg 50% 50%)", "white"] {
            assert!(is_color_spec(ok), "{ok} should be accepted");
        }
        for bad in ["", "#12", "#GGGGGG", "rgb(10,20", "url(x.png)", "red; fill: x", "3C9357"] {
            assert!(!is_color_spec(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn palette_accepts_cream_alias() {
        let palette: ColorPalette = serde_json::from_value(serde_json::json!({
            "primary": "#3C9357",
            "secondary": "#670E20",
            "white": "#FFFFFF",
            "cream": "#F9F7F2",
            "neutrals": ["#2D2D2D"]
        }))
        .unwrap();
        assert_eq!(palette.background, "#F9F7F2");
        assert!(palette.invalid_entries().is_empty());
    }

    #[test]
    fn brief_check_reports_bad_colors() {
        let mut brief = defaults::sample_brief();
        brief.brand.colors.neutrals.push("not a color".to_string());
        let err = brief.check().unwrap_err();
        assert!(err.to_string().contains("neutrals[3]"));
    }

    #[test]
    fn missing_required_fields() {
        let mut campaign = defaults::sample_campaign();
        assert!(campaign.missing_required_fields().is_empty());

        campaign.target_platforms.clear();
        campaign.cta_text = "  ".to_string();
        campaign.output_format = None;
        campaign.headline.clear();
        campaign.body_copy.clear();

        assert_eq!(
            campaign.missing_required_fields(),
            vec!["target_platforms", "cta_text", "output_format", "headline or body_copy"]
        );
    }

    #[test]
    fn headline_alone_satisfies_copy_requirement() {
        let mut campaign = defaults::sample_campaign();
        campaign.body_copy.clear();
        assert!(campaign.missing_required_fields().is_empty());
    }

    #[test]
    fn platform_specs() {
        assert_eq!(OutputFormat::HtmlCss.as_str(), "html_css");
        match Platform::PrintA4.spec() {
            PlatformSpec::Print { bleed_in, safe_margin_in, .. } => {
                assert_eq!(bleed_in, PRINT_BLEED_IN);
                assert_eq!(safe_margin_in, PRINT_SAFE_MARGIN_IN);
            }
            other => panic!("expected print spec, got {other:?}"),
        }
        match Platform::InstagramStory.spec() {
            PlatformSpec::Screen { width_px, .. } => assert_eq!(width_px, SOCIAL_WIDTH_PX),
            other => panic!("expected screen spec, got {other:?}"),
        }
    }

    #[test]
    fn campaign_parses_wire_names() {
        let campaign: CampaignBrief = serde_json::from_value(serde_json::json!({
            "campaign_type": "gift_cards",
            "headline": "Give the gift of flavor",
            "cta_text": "Buy now",
            "target_platforms": ["instagram_story", "print_a4"],
            "output_format": "html_css"
        }))
        .unwrap();
        assert_eq!(campaign.campaign_type, CampaignType::GiftCards);
        assert_eq!(campaign.primary_platform(), Some(Platform::InstagramStory));
        assert_eq!(campaign.output_format, Some(OutputFormat::HtmlCss));
        assert_eq!(campaign.offer_details, OfferTerms::default());
    }
}
