// src/services/analysis_service.rs
use std::sync::Arc;
use std::time::Duration;

use log::warn;
use serde_json::json;
use tokio::time::timeout;

use crate::errors::HuematchError;
use crate::models::{
    Analysis, BasicAnalysis, MIN_MAKEUP_TIPS, MIN_PREMIUM_COLORS, MIN_SEASONAL_ITEMS,
    MIN_WARDROBE_ENTRIES, RawBasicResponse, RawEnrichmentResponse, StoredPhoto,
};
use crate::services::fallback::FallbackGenerator;
use crate::services::storage_service::{ContentStore, ReachabilityProbe, UploadRetrier};
use crate::services::vision_service::{VisionModel, VisionRequest};

const MODEL_TIMEOUT: Duration = Duration::from_secs(60);

/// The photo-analysis pipeline: upload with retries, reachability
/// check, the primary season classification call, and the enrichment
/// call. Past the reachability check every failure degrades into
/// synthetic fallback content instead of an error; the caller always
/// gets a complete [`Analysis`] for an accepted photo.
pub struct AnalysisService {
    model: Arc<dyn VisionModel>,
    retrier: UploadRetrier,
    probe: Arc<dyn ReachabilityProbe>,
    fallback: FallbackGenerator,
    model_timeout: Duration,
}

impl AnalysisService {
    pub fn new(
        model: Arc<dyn VisionModel>,
        store: Arc<dyn ContentStore>,
        probe: Arc<dyn ReachabilityProbe>,
        fallback: FallbackGenerator,
    ) -> Self {
        Self {
            model,
            retrier: UploadRetrier::new(store),
            probe,
            fallback,
            model_timeout: MODEL_TIMEOUT,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Run the whole pipeline for an already-validated photo.
    ///
    /// Errors out only at the upload boundary: exhausted retries or a
    /// failed reachability check. Everything after that resolves.
    pub async fn analyze_photo(&self, photo: &StoredPhoto) -> Result<Analysis, HuematchError> {
        let url = self.retrier.upload(photo).await?;

        let status = self.probe.head(&url).await?;
        if !(200..300).contains(&status) {
            return Err(HuematchError::Validation(format!(
                "Uploaded photo is not reachable: status {}",
                status
            )));
        }

        let analysis = match self.analyze_from_url(&url).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Analysis of {} failed ({}), serving fallback result", url, e);
                self.fallback.full_fallback()
            }
        };

        Ok(analysis)
    }

    async fn analyze_from_url(&self, image_url: &str) -> Result<Analysis, HuematchError> {
        let basic = self.analyze_basic(image_url).await?;
        Ok(self.analyze_enhanced(basic).await)
    }

    /// Primary call: classify the season and pick three colors.
    ///
    /// Transport errors and the 60 s timeout propagate so the top-level
    /// handler can degrade; a response that parses but fails validation
    /// falls back to a synthetic basic result right here.
    async fn analyze_basic(&self, image_url: &str) -> Result<BasicAnalysis, HuematchError> {
        let request = VisionRequest {
            prompt: BASIC_PROMPT.to_string(),
            image_url: Some(image_url.to_string()),
            schema: basic_schema(),
        };

        let value = match timeout(self.model_timeout, self.model.generate(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(HuematchError::Timeout(self.model_timeout.as_secs())),
        };

        let raw: RawBasicResponse = serde_json::from_value(value)
            .map_err(|e| HuematchError::ModelResponse(format!("Unexpected response shape: {}", e)))?;

        match raw.repair() {
            Ok(basic) => Ok(basic),
            Err(e) => {
                warn!("Model output failed validation ({}), using synthetic basic result", e);
                Ok(self.fallback.basic_fallback())
            }
        }
    }

    /// Enrichment call: expand the basic result into the premium
    /// palette and styling guide. Never fails; any problem substitutes
    /// the static per-season dataset.
    async fn analyze_enhanced(&self, basic: BasicAnalysis) -> Analysis {
        let request = VisionRequest {
            prompt: enrichment_prompt(&basic),
            image_url: None,
            schema: enrichment_schema(),
        };

        let enrichment = match timeout(self.model_timeout, self.model.generate(request)).await {
            Ok(Ok(value)) => serde_json::from_value::<RawEnrichmentResponse>(value)
                .ok()
                .and_then(RawEnrichmentResponse::repair),
            Ok(Err(e)) => {
                warn!("Enrichment call failed: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    "Enrichment call timed out after {} seconds",
                    self.model_timeout.as_secs()
                );
                None
            }
        };

        match enrichment {
            Some(enrichment) => Analysis::merged(basic, enrichment),
            None => self.fallback.static_premium_data(&basic),
        }
    }
}

const BASIC_PROMPT: &str = r#"
You are a professional color analyst. Analyze the person in this photo
for seasonal color analysis. Provide:

1. SKIN TONE: the overall undertone (warm, cool, neutral, olive, deep,
   fair...) as a short phrase.

2. SEASON: exactly one of Spring, Summer, Autumn, Winter, based on the
   person's skin undertone, hair and eye color, and natural contrast.

3. FREE COLORS: exactly 3 recommended colors. Each needs a name, a
   6-digit hex code, and one sentence on why it flatters this person.

4. RECOMMENDATIONS: exactly 3 short styling recommendations tailored
   to the detected season.
"#;

fn enrichment_prompt(basic: &BasicAnalysis) -> String {
    let serialized = serde_json::to_string(basic).unwrap_or_default();
    format!(
        r#"
You are a professional color analyst. Expand this seasonal color
analysis into a complete premium palette and styling guide.

Analysis so far:
{serialized}

Provide:

1. PREMIUM COLORS: at least 20 colors for this season. Each needs a
   name, a 6-digit hex code, a one-sentence description, and a
   category: neutral, accent, statement, or soft.

2. MAKEUP TIPS: at least 8 makeup tips tuned to this season and skin
   tone.

3. WARDROBE GUIDE: at least 10 practical wardrobe-building entries.

4. SEASONAL DETAILS: a description of this season's coloring, at least
   5 characteristics, and at least 5 colors to avoid.
"#
    )
}

fn basic_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["skin_tone", "season", "free_colors", "recommendations"],
        "properties": {
            "skin_tone": { "type": "string" },
            "season": {
                "type": "string",
                "enum": ["Spring", "Summer", "Autumn", "Winter"]
            },
            "free_colors": {
                "type": "array",
                "minItems": 3,
                "maxItems": 3,
                "items": {
                    "type": "object",
                    "required": ["name", "hex", "description"],
                    "properties": {
                        "name": { "type": "string" },
                        "hex": { "type": "string" },
                        "description": { "type": "string" }
                    }
                }
            },
            "recommendations": {
                "type": "array",
                "minItems": 3,
                "maxItems": 3,
                "items": { "type": "string" }
            }
        }
    })
}

fn enrichment_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["premium_colors", "makeup_tips", "wardrobe_guide", "seasonal_details"],
        "properties": {
            "premium_colors": {
                "type": "array",
                "minItems": MIN_PREMIUM_COLORS,
                "items": {
                    "type": "object",
                    "required": ["name", "hex", "description", "category"],
                    "properties": {
                        "name": { "type": "string" },
                        "hex": { "type": "string" },
                        "description": { "type": "string" },
                        "category": {
                            "type": "string",
                            "enum": ["neutral", "accent", "statement", "soft"]
                        }
                    }
                }
            },
            "makeup_tips": {
                "type": "array",
                "minItems": MIN_MAKEUP_TIPS,
                "items": { "type": "string" }
            },
            "wardrobe_guide": {
                "type": "array",
                "minItems": MIN_WARDROBE_ENTRIES,
                "items": { "type": "string" }
            },
            "seasonal_details": {
                "type": "object",
                "required": ["description", "characteristics", "avoid_colors"],
                "properties": {
                    "description": { "type": "string" },
                    "characteristics": {
                        "type": "array",
                        "minItems": MIN_SEASONAL_ITEMS,
                        "items": { "type": "string" }
                    },
                    "avoid_colors": {
                        "type": "array",
                        "minItems": MIN_SEASONAL_ITEMS,
                        "items": { "type": "string" }
                    }
                }
            }
        }
    })
}
