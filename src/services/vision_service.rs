// src/services/vision_service.rs
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use serde_json::json;

use crate::errors::HuematchError;

/// One structured-output request: an instruction prompt, an optional
/// image to look at, and a JSON-Schema-style description of the object
/// the caller expects back.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub prompt: String,
    pub image_url: Option<String>,
    pub schema: serde_json::Value,
}

#[async_trait]
pub trait VisionModel: Send + Sync {
    fn model_name(&self) -> &str;

    /// Returns the raw object the model produced. Shape validation and
    /// repair happen in the caller; transport and protocol problems
    /// surface here as errors.
    async fn generate(&self, request: VisionRequest) -> Result<serde_json::Value, HuematchError>;
}

pub struct OpenAiVision {
    api_key: String,
    model: String,
    inline_images: bool,
    client: Client,
}

impl OpenAiVision {
    pub fn new(api_key: String, inline_images: bool) -> Self {
        Self {
            api_key,
            model: "gpt-4o".to_string(),
            inline_images,
            client: Client::new(),
        }
    }

    // For deployments where the photo store URL is not reachable from
    // the provider: fetch the bytes ourselves and inline them as a
    // base64 data URL.
    async fn fetch_as_data_url(&self, url: &str) -> Result<String, HuematchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HuematchError::ModelResponse(format!("Image fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(HuematchError::ModelResponse(format!(
                "Image fetch returned status {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let data = response
            .bytes()
            .await
            .map_err(|e| HuematchError::ModelResponse(format!("Image fetch failed: {}", e)))?;

        Ok(format!(
            "data:{};base64,{}",
            content_type,
            general_purpose::STANDARD.encode(&data)
        ))
    }
}

#[async_trait]
impl VisionModel for OpenAiVision {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: VisionRequest) -> Result<serde_json::Value, HuematchError> {
        let prompt = format!(
            "{}\n\nRespond with a single JSON object matching this schema:\n{}",
            request.prompt, request.schema
        );

        let mut content = vec![json!({
            "type": "text",
            "text": prompt
        })];

        if let Some(image_url) = &request.image_url {
            let url = if self.inline_images {
                self.fetch_as_data_url(image_url).await?
            } else {
                image_url.clone()
            };
            content.push(json!({
                "type": "image_url",
                "image_url": { "url": url }
            }));
        }

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [{
                    "role": "user",
                    "content": content
                }],
                "max_tokens": 4096,
                "response_format": { "type": "json_object" }
            }))
            .send()
            .await
            .map_err(|e| HuematchError::ModelResponse(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HuematchError::ModelResponse(format!(
                "OpenAI error: {}",
                error_text
            )));
        }

        let result: serde_json::Value = response.json().await.map_err(|e| {
            HuematchError::ModelResponse(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let object = result["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                HuematchError::ModelResponse("No content in OpenAI response".to_string())
            })?;

        serde_json::from_str(object).map_err(|e| {
            HuematchError::ModelResponse(format!("Failed to parse model JSON: {}", e))
        })
    }
}
