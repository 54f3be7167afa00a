//! Sample brand kit and campaign used to pre-fill a new brief.

use crate::brief::{
    AssetFormat, AssetInventory, AssetRef, Brief, BrandIdentity, CampaignBrief, CampaignType,
    ColorPalette, FontPair, LocationBlock, OfferTerms, OutputFormat, Platform,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn sample_brand() -> BrandIdentity {
    BrandIdentity {
        brand_name: "La Marsa Mediterranean Cuisine".to_string(),
        website: "https://lamarsacuisine.com/".to_string(),
        logo_assets: vec![AssetRef {
            id: "main-logo".to_string(),
            format: AssetFormat::Svg,
            notes: "Classic scripted logo".to_string(),
        }],
        fonts: FontPair {
            display_font: "DM Serif Display".to_string(),
            body_font: "Roboto".to_string(),
        },
        colors: ColorPalette {
            primary: "#3C9357".to_string(),
            secondary: "#670E20".to_string(),
            white: "#FFFFFF".to_string(),
            background: "#F9F7F2".to_string(),
            neutrals: strings(&["#2D2D2D", "#666666", "#E5E5E5"]),
        },
        tagline: "At La Marsa, we fuse traditional Mediterranean flavors with healthy, fresh \
                  ingredients and impeccable customer service."
            .to_string(),
        values: strings(&[
            "Fresh & Healthy Ingredients",
            "Authentic Flavors",
            "Mediterranean Hospitality",
            "Community Involvement",
        ]),
        tone_keywords: strings(&["welcoming", "authentic", "warm", "proud"]),
        aesthetic_keywords: strings(&[
            "modern-rustic",
            "authentic",
            "warm",
            "mediterranean",
            "sophisticated",
        ]),
        do_not_use: strings(&[
            "neon colors",
            "more than 2 font families",
            "low-contrast body text",
            "overcrowded layouts",
            "clipart/cheap effects",
        ]),
        image_style_notes: "Warm, natural lighting, fresh herbs, close-up food textures."
            .to_string(),
    }
}

pub fn sample_campaign() -> CampaignBrief {
    CampaignBrief {
        campaign_type: CampaignType::Catering,
        headline: "Celebrate with Mediterranean Flavor".to_string(),
        subhead: "Professional Catering for Every Occasion".to_string(),
        body_copy: "From intimate gatherings to large corporate events, La Marsa brings the \
                    authentic taste of the Mediterranean to your table. Fresh, healthy, and \
                    unforgettable."
            .to_string(),
        offer_details: OfferTerms {
            price: "10% OFF".to_string(),
            bundle: "Orders over $200".to_string(),
            promo_code: "MARSA10".to_string(),
            expires_on: "Dec 31, 2024".to_string(),
            fine_print: "Valid for first-time catering orders only. Cannot be combined with \
                         other offers."
                .to_string(),
        },
        cta_text: "Order Catering Now".to_string(),
        cta_url_or_qr_target: "https://lamarsacuisine.com/catering".to_string(),
        location_block: LocationBlock {
            name: "La Marsa West Bloomfield".to_string(),
            address: "6215 Orchard Lake Rd, West Bloomfield Township, MI 48322".to_string(),
            phone: "(248) 539-5900".to_string(),
            hours: "11AM - 10PM Daily".to_string(),
            extra: "Available for delivery & pickup".to_string(),
        },
        required_elements: strings(&["Logo", "Catering Promo Code", "Address Block"]),
        target_platforms: vec![Platform::PrintLetter],
        output_format: Some(OutputFormat::Svg),
        language: "English".to_string(),
    }
}

pub fn empty_assets() -> AssetInventory {
    AssetInventory::default()
}

pub fn sample_brief() -> Brief {
    Brief::new(sample_brand(), sample_campaign(), empty_assets())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_brief_is_valid() {
        let brief = sample_brief();
        assert!(brief.check().is_ok());
        assert!(brief.campaign.missing_required_fields().is_empty());
        assert!(!brief.assets.has_photos());
        assert_eq!(brief.brand.colors.neutrals.len(), 3);
    }

    #[test]
    fn sample_brief_survives_json() {
        let brief = sample_brief();
        let json = serde_json::to_string_pretty(&brief).unwrap();
        let back: Brief = serde_json::from_str(&json).unwrap();
        assert_eq!(back, brief);
    }
}
