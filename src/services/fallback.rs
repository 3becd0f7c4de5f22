// src/services/fallback.rs
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::{darken, lighten};
use crate::models::{
    Analysis, BasicAnalysis, ColorCategory, DEFAULT_FREE_COLORS, PaletteColor, Season,
    SeasonalDetails,
};

/// Per-channel offset used for the Light/Deep palette variants.
const VARIANT_SHIFT: u8 = 40;

/// Upper bound on the synthesized premium palette. Five base colors
/// with two variants each produce 15, so the slice normally never
/// trims anything.
const PREMIUM_CAP: usize = 24;

/// Deterministic synthetic results for every failure mode past the
/// upload boundary. The only randomness is the season pick, drawn from
/// an injected RNG so tests can pin it down with a seed.
pub struct FallbackGenerator {
    rng: Mutex<StdRng>,
}

impl FallbackGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick_season(&self) -> Season {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        Season::ALL[rng.random_range(0..Season::ALL.len())]
    }

    /// Basic result used when the first model call yields nothing
    /// usable: a random season, the generic color triad, and templated
    /// recommendations referencing the season.
    pub fn basic_fallback(&self) -> BasicAnalysis {
        let season = self.pick_season();
        let free_colors = DEFAULT_FREE_COLORS
            .iter()
            .map(|(name, hex, description)| PaletteColor {
                name: name.to_string(),
                hex: hex.to_string(),
                description: description.to_string(),
                category: None,
            })
            .collect();

        BasicAnalysis {
            skin_tone: "balanced".to_string(),
            season,
            free_colors,
            recommendations: vec![
                format!("Build your wardrobe around classic {} tones.", season),
                format!("Pick one {} accent color per outfit and repeat it in accessories.", season),
                format!("Keep metals consistent with the {} palette's undertone.", season),
                format!("When in doubt, wear your {} neutrals closest to your face.", season),
            ],
        }
    }

    /// Complete synthetic result for total-failure cases.
    pub fn full_fallback(&self) -> Analysis {
        let basic = self.basic_fallback();
        self.static_premium_data(&basic)
    }

    /// Expand an already-valid basic result with the static per-season
    /// premium dataset: 5 tagged base colors plus a Light and a Deep
    /// variant of each, makeup tips, a wardrobe guide, and seasonal
    /// detail text.
    pub fn static_premium_data(&self, basic: &BasicAnalysis) -> Analysis {
        let bases = season_palette(basic.season);

        let mut premium_colors: Vec<PaletteColor> = bases
            .iter()
            .map(|(name, hex, description, category)| PaletteColor {
                name: name.to_string(),
                hex: hex.to_string(),
                description: description.to_string(),
                category: Some(*category),
            })
            .collect();

        for (name, hex, _, _) in bases {
            premium_colors.push(PaletteColor {
                name: format!("Light {}", name),
                hex: lighten(hex, VARIANT_SHIFT).unwrap_or_else(|| hex.to_string()),
                description: format!("A softened, airy take on {}.", name.to_lowercase()),
                category: Some(ColorCategory::Soft),
            });
            premium_colors.push(PaletteColor {
                name: format!("Deep {}", name),
                hex: darken(hex, VARIANT_SHIFT).unwrap_or_else(|| hex.to_string()),
                description: format!("A richer, grounded take on {}.", name.to_lowercase()),
                category: Some(ColorCategory::Statement),
            });
        }
        premium_colors.truncate(PREMIUM_CAP);

        Analysis {
            skin_tone: basic.skin_tone.clone(),
            season: basic.season,
            free_colors: basic.free_colors.clone(),
            premium_colors,
            recommendations: basic.recommendations.clone(),
            makeup_tips: Some(makeup_tips(basic.season)),
            wardrobe_guide: Some(wardrobe_guide()),
            seasonal_details: Some(seasonal_details(basic.season)),
        }
    }
}

impl Default for FallbackGenerator {
    fn default() -> Self {
        Self::new()
    }
}

type BaseColor = (&'static str, &'static str, &'static str, ColorCategory);

fn season_palette(season: Season) -> [BaseColor; 5] {
    match season {
        Season::Spring => [
            ("Warm Peach", "#F4A582", "Fresh warmth that echoes spring light.", ColorCategory::Soft),
            ("Golden Yellow", "#F2C94C", "Sunlit yellow that energizes the whole palette.", ColorCategory::Statement),
            ("Leaf Green", "#7FB069", "Clear green with a lively yellow base.", ColorCategory::Accent),
            ("Ivory", "#FAF3E0", "Warm off-white that replaces stark white.", ColorCategory::Neutral),
            ("Coral", "#FF6F61", "Bright coral that flatters warm undertones.", ColorCategory::Accent),
        ],
        Season::Summer => [
            ("Powder Blue", "#A7C7E7", "Hazy blue with a cool gray cast.", ColorCategory::Soft),
            ("Lavender", "#B9A7D6", "Muted violet that stays gentle, never loud.", ColorCategory::Accent),
            ("Rose Pink", "#D8A7B1", "Dusty pink with a cool blue base.", ColorCategory::Soft),
            ("Cool Gray", "#9BA8AB", "Blue-leaning gray for effortless neutrals.", ColorCategory::Neutral),
            ("Soft White", "#F4F6F5", "A chalky white kinder than pure white.", ColorCategory::Neutral),
        ],
        Season::Autumn => [
            ("Rust", "#B7410E", "Earthy red-orange with real depth.", ColorCategory::Statement),
            ("Olive", "#708238", "Mossy green grounded in yellow.", ColorCategory::Accent),
            ("Mustard", "#D4A017", "Spiced gold that warms the face.", ColorCategory::Statement),
            ("Camel", "#C19A6B", "Golden tan that works as a true neutral.", ColorCategory::Neutral),
            ("Terracotta", "#C8553D", "Baked clay tone between red and orange.", ColorCategory::Accent),
        ],
        Season::Winter => [
            ("True Red", "#BF1932", "Clean blue-based red at full strength.", ColorCategory::Statement),
            ("Emerald", "#0F7B5F", "Jewel green with icy clarity.", ColorCategory::Accent),
            ("Royal Blue", "#2C3E91", "Saturated blue that holds its own.", ColorCategory::Statement),
            ("Charcoal", "#36454F", "Near-black that is softer than black.", ColorCategory::Neutral),
            ("Icy White", "#F8F8FF", "Crisp white with a cool blue tint.", ColorCategory::Neutral),
        ],
    }
}

fn makeup_tips(season: Season) -> Vec<String> {
    vec![
        format!("Match your foundation undertone to your {} coloring rather than fighting it.", season),
        format!("Choose blush from the {} palette's soft tones for a natural flush.", season),
        format!("A lip color pulled from your {} accents ties any look together.", season),
        format!("Keep eyeshadow in {} neutrals for daytime and save statements for evening.", season),
        format!("Eyeliner slightly softer than black suits most {} complexions.", season),
        format!("Brow products one shade lighter than your hair keep the {} look balanced.", season),
        format!("For evening, deepen your usual {} shades instead of switching families.", season),
        format!("Skip shades your {} palette lists under colors to avoid, even in makeup.", season),
    ]
}

fn wardrobe_guide() -> Vec<String> {
    [
        "Anchor the closet with three neutrals from your palette before adding accents.",
        "Buy basics in your neutral shades and save statement colors for single pieces.",
        "Repeat one accent color between top, shoes, or bag to make outfits cohere.",
        "Check fabric against your face in daylight before committing to a color.",
        "Replace pure black near the face with your palette's darkest neutral.",
        "Use your soft tones for office wear and statements for occasions.",
        "Patterns work when their dominant color belongs to your palette.",
        "Keep metals and leathers consistent with your palette's temperature.",
        "When a piece feels off, compare its undertone to your season's base.",
        "Audit the closet seasonally and move off-palette pieces out of rotation.",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn seasonal_details(season: Season) -> SeasonalDetails {
    SeasonalDetails {
        description: format!(
            "As a {}, your natural coloring harmonizes with the {} palette: wearing its tones near your face evens skin, brightens eyes, and lets you wear less makeup.",
            season,
            season.name().to_lowercase()
        ),
        characteristics: [
            "Skin, hair, and eyes share one temperature family",
            "Colors in your palette make the face look rested",
            "Off-palette colors cast shadows or wash you out",
            "Contrast level matters as much as hue",
            "Your best metals follow your undertone",
        ]
        .into_iter()
        .map(str::to_string)
        .collect(),
        avoid_colors: [
            "Colors from the opposite temperature family",
            "Neon brights that overpower your natural contrast",
            "Muddy mid-tones that blur your features",
            "Stark pure white straight against the face",
            "Flat black as an all-over look",
        ]
        .into_iter()
        .map(str::to_string)
        .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::is_valid_hex;

    #[test]
    fn basic_fallback_is_complete() {
        let generator = FallbackGenerator::with_seed(7);
        let basic = generator.basic_fallback();
        assert_eq!(basic.free_colors.len(), 3);
        assert_eq!(basic.recommendations.len(), 4);
        assert!(Season::ALL.contains(&basic.season));
        assert!(basic.recommendations[0].contains(basic.season.name()));
    }

    #[test]
    fn seeded_generator_is_reproducible() {
        let a = FallbackGenerator::with_seed(42).basic_fallback().season;
        let b = FallbackGenerator::with_seed(42).basic_fallback().season;
        assert_eq!(a, b);
    }

    #[test]
    fn premium_palette_produces_fifteen_colors() {
        // 5 bases + 2 variants each; the 24 cap never bites today.
        let generator = FallbackGenerator::with_seed(1);
        let analysis = generator.full_fallback();
        assert_eq!(analysis.premium_colors.len(), 15);
    }

    #[test]
    fn premium_palette_hexes_are_valid_for_every_season() {
        let generator = FallbackGenerator::with_seed(1);
        for season in Season::ALL {
            let basic = BasicAnalysis {
                skin_tone: "balanced".to_string(),
                season,
                free_colors: vec![],
                recommendations: vec![],
            };
            let analysis = generator.static_premium_data(&basic);
            for color in &analysis.premium_colors {
                assert!(is_valid_hex(&color.hex), "bad hex {} in {}", color.hex, season);
            }
        }
    }

    #[test]
    fn variants_are_tagged_soft_and_statement() {
        let generator = FallbackGenerator::with_seed(3);
        let basic = BasicAnalysis {
            skin_tone: "warm".to_string(),
            season: Season::Autumn,
            free_colors: vec![],
            recommendations: vec![],
        };
        let analysis = generator.static_premium_data(&basic);
        let light: Vec<_> = analysis
            .premium_colors
            .iter()
            .filter(|c| c.name.starts_with("Light "))
            .collect();
        let deep: Vec<_> = analysis
            .premium_colors
            .iter()
            .filter(|c| c.name.starts_with("Deep "))
            .collect();
        assert_eq!(light.len(), 5);
        assert_eq!(deep.len(), 5);
        assert!(light.iter().all(|c| c.category == Some(ColorCategory::Soft)));
        assert!(deep.iter().all(|c| c.category == Some(ColorCategory::Statement)));
    }

    #[test]
    fn full_fallback_fills_every_premium_field() {
        let generator = FallbackGenerator::with_seed(9);
        let analysis = generator.full_fallback();
        assert!(!analysis.premium_colors.is_empty());
        assert_eq!(analysis.makeup_tips.as_ref().map(Vec::len), Some(8));
        assert_eq!(analysis.wardrobe_guide.as_ref().map(Vec::len), Some(10));
        let details = analysis.seasonal_details.expect("details");
        assert_eq!(details.characteristics.len(), 5);
        assert_eq!(details.avoid_colors.len(), 5);
        assert!(details.description.contains(analysis.season.name()));
    }

    #[test]
    fn seasons_get_distinct_palettes() {
        let spring: Vec<_> = season_palette(Season::Spring).iter().map(|c| c.1).collect();
        let winter: Vec<_> = season_palette(Season::Winter).iter().map(|c| c.1).collect();
        assert_ne!(spring, winter);
    }
}
