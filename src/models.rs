// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::normalize_hex;
use crate::errors::HuematchError;

/// Colors appended when the model returns fewer than three free colors,
/// in this order.
pub const DEFAULT_FREE_COLORS: [(&str, &str, &str); 3] = [
    (
        "Classic Navy",
        "#1F3A5F",
        "A dependable deep blue that anchors any outfit.",
    ),
    (
        "Soft Cream",
        "#F5F0E1",
        "A gentle warm neutral that brightens the face.",
    ),
    (
        "Dusty Rose",
        "#C48793",
        "A muted rose that flatters most complexions.",
    ),
];

/// Minimums the enrichment call's output must meet to count as a
/// success instead of degrading to the static dataset.
pub const MIN_PREMIUM_COLORS: usize = 20;
pub const MIN_MAKEUP_TIPS: usize = 8;
pub const MIN_WARDROBE_ENTRIES: usize = 10;
pub const MIN_SEASONAL_ITEMS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn parse(s: &str) -> Option<Season> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Some(Season::Spring),
            "summer" => Some(Season::Summer),
            "autumn" => Some(Season::Autumn),
            "winter" => Some(Season::Winter),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorCategory {
    Neutral,
    Accent,
    Statement,
    Soft,
}

impl ColorCategory {
    pub fn parse(s: &str) -> Option<ColorCategory> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neutral" => Some(ColorCategory::Neutral),
            "accent" => Some(ColorCategory::Accent),
            "statement" => Some(ColorCategory::Statement),
            "soft" => Some(ColorCategory::Soft),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteColor {
    pub name: String,
    pub hex: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ColorCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicAnalysis {
    pub skin_tone: String,
    pub season: Season,
    pub free_colors: Vec<PaletteColor>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalDetails {
    pub description: String,
    pub characteristics: Vec<String>,
    pub avoid_colors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub skin_tone: String,
    pub season: Season,
    pub free_colors: Vec<PaletteColor>,
    pub premium_colors: Vec<PaletteColor>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub makeup_tips: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wardrobe_guide: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasonal_details: Option<SeasonalDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPhoto {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub data: Vec<u8>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub analysis: Analysis,
    pub processing_time_ms: u64,
    pub model_used: String,
    pub created_at: DateTime<Utc>,
}

// Raw model output. Every field is optional or defaulted; the repair
// step below turns these into the invariant-respecting types above
// instead of patching loose JSON in place.

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawColor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hex: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl RawColor {
    /// Repair into a [`PaletteColor`]. Colors without a usable name or
    /// hex are dropped rather than invented.
    pub fn into_color(self) -> Option<PaletteColor> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        let hex = normalize_hex(&self.hex)?;
        Some(PaletteColor {
            name: name.to_string(),
            hex,
            description: self.description.trim().to_string(),
            category: self.category.as_deref().and_then(ColorCategory::parse),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawBasicResponse {
    #[serde(default, alias = "skinTone")]
    pub skin_tone: String,
    #[serde(default)]
    pub season: String,
    #[serde(default, alias = "freeColors", alias = "colors")]
    pub free_colors: Vec<RawColor>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl RawBasicResponse {
    /// Validate and repair the first model call's output.
    ///
    /// Lenient on purpose: fewer than three colors is padded from
    /// [`DEFAULT_FREE_COLORS`], hex codes are normalized, and short
    /// recommendation lists are topped up. Only a missing skin tone,
    /// an unknown season, or zero usable colors fail the repair.
    pub fn repair(self) -> Result<BasicAnalysis, HuematchError> {
        let skin_tone = self.skin_tone.trim().to_string();
        if skin_tone.is_empty() {
            return Err(HuematchError::ModelResponse(
                "missing skin tone in model output".to_string(),
            ));
        }

        let season = Season::parse(&self.season).ok_or_else(|| {
            HuematchError::ModelResponse(format!("unknown season '{}' in model output", self.season))
        })?;

        let mut free_colors: Vec<PaletteColor> = self
            .free_colors
            .into_iter()
            .filter_map(RawColor::into_color)
            .collect();
        if free_colors.is_empty() {
            return Err(HuematchError::ModelResponse(
                "no usable colors in model output".to_string(),
            ));
        }
        free_colors.truncate(3);
        for (name, hex, description) in DEFAULT_FREE_COLORS {
            if free_colors.len() >= 3 {
                break;
            }
            free_colors.push(PaletteColor {
                name: name.to_string(),
                hex: hex.to_string(),
                description: description.to_string(),
                category: None,
            });
        }

        let mut recommendations: Vec<String> = self
            .recommendations
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        recommendations.truncate(3);
        while recommendations.len() < 3 {
            recommendations.push(format!(
                "Lean on your {} palette when choosing pieces close to your face.",
                season
            ));
        }

        Ok(BasicAnalysis {
            skin_tone,
            season,
            free_colors,
            recommendations,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawSeasonalDetails {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub characteristics: Vec<String>,
    #[serde(default, alias = "avoidColors")]
    pub avoid_colors: Vec<String>,
}

impl RawSeasonalDetails {
    /// Repair seasonal details. Output below the documented minimums
    /// counts as missing.
    pub fn repair(self) -> Option<SeasonalDetails> {
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return None;
        }

        let clean = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        let characteristics = clean(self.characteristics);
        let avoid_colors = clean(self.avoid_colors);
        if characteristics.len() < MIN_SEASONAL_ITEMS || avoid_colors.len() < MIN_SEASONAL_ITEMS {
            return None;
        }

        Some(SeasonalDetails {
            description,
            characteristics,
            avoid_colors,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawEnrichmentResponse {
    #[serde(default, alias = "premiumColors")]
    pub premium_colors: Vec<RawColor>,
    #[serde(default, alias = "makeupTips")]
    pub makeup_tips: Vec<String>,
    #[serde(default, alias = "wardrobeGuide")]
    pub wardrobe_guide: Vec<String>,
    #[serde(default, alias = "seasonalDetails")]
    pub seasonal_details: Option<RawSeasonalDetails>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Repaired enrichment output, ready to merge onto a [`BasicAnalysis`].
#[derive(Debug, Clone)]
pub struct Enrichment {
    pub premium_colors: Vec<PaletteColor>,
    pub makeup_tips: Vec<String>,
    pub wardrobe_guide: Vec<String>,
    pub seasonal_details: SeasonalDetails,
    pub recommendations: Option<Vec<String>>,
}

impl RawEnrichmentResponse {
    /// Repair the enrichment call's output, validating it against the
    /// declared minimums: 20 premium colors, 8 makeup tips, 10
    /// wardrobe entries, and complete seasonal details. Anything short
    /// of that counts as a failed enrichment and yields `None`; the
    /// caller substitutes static data instead.
    pub fn repair(self) -> Option<Enrichment> {
        let premium_colors: Vec<PaletteColor> = self
            .premium_colors
            .into_iter()
            .filter_map(RawColor::into_color)
            .collect();
        if premium_colors.len() < MIN_PREMIUM_COLORS {
            return None;
        }

        let clean = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        let makeup_tips = clean(self.makeup_tips);
        if makeup_tips.len() < MIN_MAKEUP_TIPS {
            return None;
        }

        let wardrobe_guide = clean(self.wardrobe_guide);
        if wardrobe_guide.len() < MIN_WARDROBE_ENTRIES {
            return None;
        }

        let seasonal_details = self.seasonal_details.and_then(RawSeasonalDetails::repair)?;

        // recommendations stay optional: the basic result's list is
        // kept unless the model supplied a full replacement
        let recommendations = Some(clean(self.recommendations)).filter(|r| r.len() >= 3);

        Some(Enrichment {
            premium_colors,
            makeup_tips,
            wardrobe_guide,
            seasonal_details,
            recommendations,
        })
    }
}

impl Analysis {
    /// Merge enrichment output onto a basic analysis. Enrichment fields
    /// win where both sides carry a value; the basic fields survive
    /// everywhere else.
    pub fn merged(basic: BasicAnalysis, enrichment: Enrichment) -> Analysis {
        Analysis {
            skin_tone: basic.skin_tone,
            season: basic.season,
            free_colors: basic.free_colors,
            premium_colors: enrichment.premium_colors,
            recommendations: enrichment
                .recommendations
                .unwrap_or(basic.recommendations),
            makeup_tips: Some(enrichment.makeup_tips),
            wardrobe_guide: Some(enrichment.wardrobe_guide),
            seasonal_details: Some(enrichment.seasonal_details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn raw_color(name: &str, hex: &str) -> RawColor {
        RawColor {
            name: name.to_string(),
            hex: hex.to_string(),
            description: String::new(),
            category: None,
        }
    }

    #[test]
    fn season_parse_is_case_insensitive() {
        assert_eq!(Season::parse("autumn"), Some(Season::Autumn));
        assert_eq!(Season::parse(" WINTER "), Some(Season::Winter));
        assert_eq!(Season::parse("monsoon"), None);
        assert_eq!(Season::parse(""), None);
    }

    #[test]
    fn raw_color_repairs_hex() {
        let color = raw_color("Coral", "f60").into_color().unwrap();
        assert_eq!(color.hex, "#ff6600");
    }

    #[test]
    fn raw_color_without_name_is_dropped() {
        assert!(raw_color("", "#ff6600").into_color().is_none());
        assert!(raw_color("  ", "#ff6600").into_color().is_none());
    }

    #[test]
    fn raw_color_with_broken_hex_is_dropped() {
        assert!(raw_color("Coral", "not-a-color").into_color().is_none());
    }

    #[test]
    fn raw_color_parses_known_category() {
        let raw = RawColor {
            category: Some("Statement".to_string()),
            ..raw_color("Rust", "#B7410E")
        };
        assert_eq!(raw.into_color().unwrap().category, Some(ColorCategory::Statement));
    }

    #[test]
    fn basic_repair_pads_free_colors_to_three() {
        let raw = RawBasicResponse {
            skin_tone: "warm".to_string(),
            season: "Autumn".to_string(),
            free_colors: vec![raw_color("Terracotta", "#C8553D")],
            recommendations: vec!["a".into(), "b".into(), "c".into()],
        };
        let basic = raw.repair().unwrap();
        assert_eq!(basic.free_colors.len(), 3);
        assert_eq!(basic.free_colors[1].name, "Classic Navy");
        assert_eq!(basic.free_colors[2].name, "Soft Cream");
    }

    #[test]
    fn basic_repair_truncates_extra_colors() {
        let raw = RawBasicResponse {
            skin_tone: "cool".to_string(),
            season: "winter".to_string(),
            free_colors: (0..5).map(|i| raw_color(&format!("C{i}"), "#112233")).collect(),
            recommendations: vec!["a".into(), "b".into(), "c".into()],
        };
        assert_eq!(raw.repair().unwrap().free_colors.len(), 3);
    }

    #[test]
    fn basic_repair_rejects_missing_skin_tone() {
        let raw = RawBasicResponse {
            season: "Spring".to_string(),
            free_colors: vec![raw_color("Coral", "#FF6F61")],
            ..Default::default()
        };
        assert_matches!(raw.repair(), Err(HuematchError::ModelResponse(_)));
    }

    #[test]
    fn basic_repair_rejects_unknown_season() {
        let raw = RawBasicResponse {
            skin_tone: "warm".to_string(),
            season: "mud".to_string(),
            free_colors: vec![raw_color("Coral", "#FF6F61")],
            ..Default::default()
        };
        assert_matches!(raw.repair(), Err(HuematchError::ModelResponse(_)));
    }

    #[test]
    fn basic_repair_rejects_empty_color_list() {
        let raw = RawBasicResponse {
            skin_tone: "warm".to_string(),
            season: "Summer".to_string(),
            free_colors: vec![raw_color("", "zzz")],
            ..Default::default()
        };
        assert_matches!(raw.repair(), Err(HuematchError::ModelResponse(_)));
    }

    #[test]
    fn basic_repair_truncates_extra_recommendations() {
        let raw = RawBasicResponse {
            skin_tone: "cool".to_string(),
            season: "Summer".to_string(),
            free_colors: vec![raw_color("Lavender", "#B9A7D6")],
            recommendations: (0..6).map(|i| format!("Tip {i}")).collect(),
        };
        let basic = raw.repair().unwrap();
        assert_eq!(basic.recommendations.len(), 3);
        assert_eq!(basic.recommendations[2], "Tip 2");
    }

    #[test]
    fn basic_repair_tops_up_recommendations() {
        let raw = RawBasicResponse {
            skin_tone: "warm".to_string(),
            season: "Spring".to_string(),
            free_colors: vec![raw_color("Coral", "#FF6F61")],
            recommendations: vec!["Wear coral.".to_string()],
        };
        let basic = raw.repair().unwrap();
        assert_eq!(basic.recommendations.len(), 3);
        assert_eq!(basic.recommendations[0], "Wear coral.");
    }

    #[test]
    fn basic_response_accepts_camel_case_keys() {
        let json = serde_json::json!({
            "skinTone": "warm",
            "season": "Autumn",
            "freeColors": [{"name": "Rust", "hex": "B7410E", "description": ""}],
            "recommendations": ["x", "y", "z"]
        });
        let raw: RawBasicResponse = serde_json::from_value(json).unwrap();
        let basic = raw.repair().unwrap();
        assert_eq!(basic.skin_tone, "warm");
        assert_eq!(basic.free_colors[0].hex, "#B7410E");
    }

    fn full_raw_enrichment() -> RawEnrichmentResponse {
        RawEnrichmentResponse {
            premium_colors: (0..MIN_PREMIUM_COLORS)
                .map(|i| raw_color(&format!("Shade {i}"), "#104080"))
                .collect(),
            makeup_tips: (0..MIN_MAKEUP_TIPS).map(|i| format!("Tip {i}")).collect(),
            wardrobe_guide: (0..MIN_WARDROBE_ENTRIES)
                .map(|i| format!("Entry {i}"))
                .collect(),
            seasonal_details: Some(RawSeasonalDetails {
                description: "Warm and muted.".to_string(),
                characteristics: (0..MIN_SEASONAL_ITEMS).map(|i| format!("Trait {i}")).collect(),
                avoid_colors: (0..MIN_SEASONAL_ITEMS).map(|i| format!("Avoid {i}")).collect(),
            }),
            recommendations: vec![],
        }
    }

    #[test]
    fn enrichment_repair_requires_premium_colors() {
        let raw = RawEnrichmentResponse {
            makeup_tips: vec!["tip".to_string()],
            ..Default::default()
        };
        assert!(raw.repair().is_none());
    }

    #[test]
    fn enrichment_repair_accepts_complete_output() {
        let enrichment = full_raw_enrichment().repair().unwrap();
        assert_eq!(enrichment.premium_colors.len(), MIN_PREMIUM_COLORS);
        assert_eq!(enrichment.makeup_tips.len(), MIN_MAKEUP_TIPS);
        assert_eq!(enrichment.wardrobe_guide.len(), MIN_WARDROBE_ENTRIES);
        // an empty recommendation list never overrides the basic one
        assert!(enrichment.recommendations.is_none());
    }

    #[test]
    fn enrichment_repair_rejects_too_few_colors() {
        let raw = RawEnrichmentResponse {
            premium_colors: (0..2).map(|i| raw_color(&format!("Shade {i}"), "#104080")).collect(),
            ..full_raw_enrichment()
        };
        assert!(raw.repair().is_none());
    }

    #[test]
    fn enrichment_repair_rejects_too_few_tips() {
        let raw = RawEnrichmentResponse {
            makeup_tips: vec!["only one tip".to_string()],
            ..full_raw_enrichment()
        };
        assert!(raw.repair().is_none());
    }

    #[test]
    fn enrichment_repair_rejects_short_wardrobe_guide() {
        let raw = RawEnrichmentResponse {
            wardrobe_guide: (0..4).map(|i| format!("Entry {i}")).collect(),
            ..full_raw_enrichment()
        };
        assert!(raw.repair().is_none());
    }

    #[test]
    fn enrichment_repair_rejects_incomplete_seasonal_details() {
        let raw = RawEnrichmentResponse {
            seasonal_details: Some(RawSeasonalDetails {
                description: "Warm and muted.".to_string(),
                characteristics: vec!["only one".to_string()],
                avoid_colors: (0..MIN_SEASONAL_ITEMS).map(|i| format!("Avoid {i}")).collect(),
            }),
            ..full_raw_enrichment()
        };
        assert!(raw.repair().is_none());

        let raw = RawEnrichmentResponse {
            seasonal_details: None,
            ..full_raw_enrichment()
        };
        assert!(raw.repair().is_none());
    }

    #[test]
    fn enrichment_repair_keeps_full_replacement_recommendations() {
        let raw = RawEnrichmentResponse {
            recommendations: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..full_raw_enrichment()
        };
        let enrichment = raw.repair().unwrap();
        assert_eq!(enrichment.recommendations.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn merged_prefers_enrichment_recommendations() {
        let basic = BasicAnalysis {
            skin_tone: "warm".to_string(),
            season: Season::Autumn,
            free_colors: vec![],
            recommendations: vec!["basic".to_string()],
        };
        let enrichment = Enrichment {
            recommendations: Some(vec!["enriched".to_string()]),
            ..full_raw_enrichment().repair().unwrap()
        };
        let merged = Analysis::merged(basic, enrichment);
        assert_eq!(merged.recommendations, vec!["enriched".to_string()]);
        assert_eq!(merged.season, Season::Autumn);
        assert_eq!(merged.makeup_tips.as_ref().map(Vec::len), Some(MIN_MAKEUP_TIPS));
        assert!(merged.seasonal_details.is_some());
    }
}
