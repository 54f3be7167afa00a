// Prompt text for the four generation stages.
//
// System prompts carry the role and the non-negotiable rules; user prompts
// carry the brief as JSON. Response shape is enforced by the JSON schema
// attached to each request, so the prompts only describe intent.

use flyerforge_common::{
    AssetInventory, BrandIdentity, CampaignBrief, ConceptVariant, DesignArtifact, ForgeError,
    OutputFormat, PlatformSpec,
};

use crate::generator::MAX_QUESTIONS;

pub fn validation_system_prompt() -> String {
    format!(
        r#"You are FlyerForge Pro, lead auditor for a flyer production studio.

Decide whether a campaign brief is production-ready.

REQUIRED FIELDS:
- target_platforms (at least one)
- cta_text
- output_format
- headline or body_copy (at least one of them)

If critical information is missing or contradictory, return up to {MAX_QUESTIONS} short clarifying questions addressed to the client.
If the brief is complete, return an empty list of questions. Do not ask about optional details."#
    )
}

pub fn validation_user_prompt(
    brand: &BrandIdentity,
    campaign: &CampaignBrief,
) -> Result<String, ForgeError> {
    Ok(format!(
        "Brand: {}\n\nCampaign brief:\n{}",
        brand.brand_name,
        serde_json::to_string_pretty(campaign)?
    ))
}

pub const STRATEGY_SYSTEM_PROMPT: &str = r#"You are FlyerForge Pro, art director for a flyer production studio.

Write a short creative strategy for the campaign and propose exactly three concept variants with ids A, B and C, then pick the strongest one and explain why.

NON-NEGOTIABLE RULES:
1. Do not invent facts. Addresses, prices, dates, phone numbers and promo codes come from the brief only.
2. Respect the brand's do_not_use list, palette and font pairing.
3. If no photos are provided, write 2-4 image-generation prompts in the brand's image style. Otherwise return an empty list.
4. Each concept gets a title, a one-paragraph description and a concrete layout direction."#;

pub fn strategy_user_prompt(
    brand: &BrandIdentity,
    campaign: &CampaignBrief,
    assets: &AssetInventory,
) -> Result<String, ForgeError> {
    let photo_note = if assets.has_photos() {
        "Photos are available; design around them."
    } else {
        "No photos were supplied; image prompts are required."
    };
    Ok(format!(
        "Brand kit:\n{}\n\nCampaign:\n{}\n\nAssets:\n{}\n\n{photo_note}",
        serde_json::to_string_pretty(brand)?,
        serde_json::to_string_pretty(campaign)?,
        serde_json::to_string_pretty(assets)?,
    ))
}

pub const DRAFT_SYSTEM_PROMPT: &str = r#"You are FlyerForge Pro, senior production designer.

Produce a production-ready design for the chosen concept: a structured design description (document, grid, tokens, layers back to front, asset slots) and the matching rendered markup.

RULES:
- Use only the brand palette and the two brand fonts.
- Keep every text element inside the safe area; extend background elements into the bleed.
- The CTA is the second most prominent element after the headline.
- Markup must be self-contained: no external images, fonts or stylesheets. Use color blocks or labelled placeholders where photos are missing.
- Render text as real text elements so it stays editable.
- Layer ids must be unique and match the ids used in the markup.
- Production notes cover export settings, color profile and resolution guidance."#;

pub fn draft_user_prompt(
    brand: &BrandIdentity,
    campaign: &CampaignBrief,
    assets: &AssetInventory,
    concept: &ConceptVariant,
) -> Result<String, ForgeError> {
    let platform = match campaign.primary_platform() {
        Some(platform) => format!("{platform} ({})", platform.spec()),
        None => "unspecified".to_string(),
    };

    Ok(format!(
        "Concept {id}: {title}\n{description}\nLayout direction: {layout}\n\n\
         Platform: {platform}\n{constraints}\nOutput: {output}\n\n\
         Brand colors: primary {primary}, secondary {secondary}, background {background}, white {white}\n\
         Fonts: display \"{display}\", body \"{body}\"\n\n\
         Brand kit:\n{brand_json}\n\nCampaign:\n{campaign_json}\n\nAssets:\n{assets_json}",
        id = concept.id,
        title = concept.title,
        description = concept.description,
        layout = concept.layout_direction,
        constraints = platform_constraints(campaign),
        output = output_instructions(campaign.output_format, "svg_code"),
        primary = brand.colors.primary,
        secondary = brand.colors.secondary,
        background = brand.colors.background,
        white = brand.colors.white,
        display = brand.fonts.display_font,
        body = brand.fonts.body_font,
        brand_json = serde_json::to_string_pretty(brand)?,
        campaign_json = serde_json::to_string_pretty(campaign)?,
        assets_json = serde_json::to_string_pretty(assets)?,
    ))
}

pub const AUDIT_SYSTEM_PROMPT: &str = r#"You are a brand compliance auditor and prepress specialist.

Run a preflight and QA check on the design, then return a revised design that fixes every issue you found.

CRITICAL CHECKS:
- Brand compliance: palette, fonts, do_not_use list.
- Legibility: contrast ratios, minimum type sizes.
- CTA clarity: the CTA is the second most prominent element.
- Prepress: bleed usage, safe zones, resolution.
- Facts: nothing beyond what the brief states.

Score the revised design from 0 to 100 as an integer. Set is_perfect only when nothing is left to fix, independent of the score.
Always return the full revised design and markup, even when nothing changed."#;

pub fn audit_user_prompt(
    brand: &BrandIdentity,
    campaign: &CampaignBrief,
    artifact: &DesignArtifact,
    iteration: u32,
) -> Result<String, ForgeError> {
    Ok(format!(
        "QA iteration #{iteration}\n\n{constraints}\nOutput: {output}\n\n\
         Brand kit:\n{brand_json}\n\nCampaign:\n{campaign_json}\n\n\
         Design JSON:\n{design_json}\n\nMarkup:\n{markup}",
        constraints = platform_constraints(campaign),
        output = output_instructions(campaign.output_format, "revised_svg_code"),
        brand_json = serde_json::to_string_pretty(brand)?,
        campaign_json = serde_json::to_string_pretty(campaign)?,
        design_json = serde_json::to_string_pretty(&artifact.spec)?,
        markup = if artifact.markup.is_empty() {
            "(none)"
        } else {
            artifact.markup.as_str()
        },
    ))
}

fn platform_constraints(campaign: &CampaignBrief) -> String {
    match campaign.primary_platform().map(|p| p.spec()) {
        Some(PlatformSpec::Print {
            size,
            dpi,
            bleed_in,
            safe_margin_in,
            ..
        }) => format!(
            "Print constraints: {size} in inches, {bleed_in}in bleed, {safe_margin_in}in safe margin, {dpi} dpi."
        ),
        Some(PlatformSpec::Screen {
            width_px,
            height_px,
            safe_zone_px,
        }) => format!(
            "Screen constraints: {width_px}x{height_px}px canvas in px units, keep {safe_zone_px}px clear of platform UI."
        ),
        None => "No target platform given; default to print letter constraints.".to_string(),
    }
}

/// `field` is the response field that carries the markup.
fn output_instructions(format: Option<OutputFormat>, field: &str) -> String {
    match format {
        Some(OutputFormat::Svg) | None => {
            format!("a single self-contained SVG document in {field}")
        }
        Some(OutputFormat::HtmlCss) => {
            format!("a single self-contained HTML document with inline CSS in {field}")
        }
        Some(OutputFormat::JsonOnly) => {
            format!("structured design only; set {field} to an empty string")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyerforge_common::defaults::{sample_brand, sample_campaign};
    use flyerforge_common::{ConceptId, Platform};

    fn concept() -> ConceptVariant {
        ConceptVariant {
            id: ConceptId::B,
            title: "Golden Hour Feast".to_string(),
            description: "Warm overhead spread".to_string(),
            layout_direction: "Full-bleed hero, CTA band at the bottom".to_string(),
        }
    }

    #[test]
    fn validation_prompt_lists_required_fields() {
        let system = validation_system_prompt();
        for field in ["target_platforms", "cta_text", "output_format", "headline or body_copy"] {
            assert!(system.contains(field), "missing {field}");
        }
        assert!(system.contains("up to 8"));
    }

    #[test]
    fn draft_prompt_carries_print_constraints() {
        let assets = AssetInventory::default();
        let prompt = draft_user_prompt(&sample_brand(), &sample_campaign(), &assets, &concept()).unwrap();
        assert!(prompt.contains("Concept B: Golden Hour Feast"));
        assert!(prompt.contains("0.125in bleed"));
        assert!(prompt.contains("0.25in safe margin"));
        assert!(prompt.contains("300 dpi"));
        assert!(prompt.contains("DM Serif Display"));
        assert!(prompt.contains("self-contained SVG"));
    }

    #[test]
    fn draft_prompt_carries_screen_constraints() {
        let mut campaign = sample_campaign();
        campaign.target_platforms = vec![Platform::InstagramStory, Platform::PrintLetter];
        campaign.output_format = Some(OutputFormat::HtmlCss);
        let prompt =
            draft_user_prompt(&sample_brand(), &campaign, &AssetInventory::default(), &concept()).unwrap();
        assert!(prompt.contains("1080x1920px"));
        assert!(prompt.contains("HTML document"));
        assert!(!prompt.contains("bleed,"));
    }

    #[test]
    fn strategy_prompt_asks_for_image_prompts_without_photos() {
        let prompt =
            strategy_user_prompt(&sample_brand(), &sample_campaign(), &AssetInventory::default()).unwrap();
        assert!(prompt.contains("image prompts are required"));
        assert!(prompt.contains("MARSA10"));
    }

    #[test]
    fn output_instructions_name_the_markup_field() {
        let draft =
            draft_user_prompt(&sample_brand(), &sample_campaign(), &AssetInventory::default(), &concept()).unwrap();
        assert!(draft.contains("SVG document in svg_code"));

        let mut campaign = sample_campaign();
        campaign.output_format = Some(OutputFormat::JsonOnly);
        let artifact = crate::testing::fixture_artifact("audit");
        let audit = audit_user_prompt(&sample_brand(), &campaign, &artifact, 1).unwrap();
        assert!(audit.contains("set revised_svg_code to an empty string"));
        assert!(!audit.contains("markup field"));
    }
}
