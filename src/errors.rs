// src/errors.rs
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuematchError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload failed after {attempts} attempts: {message}")]
    Upload { attempts: u32, message: String },

    #[error("Analysis timed out after {0} seconds")]
    Timeout(u64),

    #[error("Model response error: {0}")]
    ModelResponse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ResponseError for HuematchError {
    fn error_response(&self) -> HttpResponse {
        match self {
            HuematchError::Validation(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Validation error",
                "message": self.to_string()
            })),
            HuematchError::Upload { .. } => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "Upload error",
                "message": self.to_string()
            })),
            HuematchError::Timeout(_) => HttpResponse::GatewayTimeout().json(serde_json::json!({
                "error": "AI service timeout",
                "message": self.to_string()
            })),
            HuematchError::ModelResponse(_) => {
                HttpResponse::ServiceUnavailable().json(serde_json::json!({
                    "error": "AI service error",
                    "message": self.to_string()
                }))
            }
            HuematchError::Storage(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Storage error",
                    "message": self.to_string()
                }))
            }
            HuematchError::Serialization(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Data processing error",
                    "message": self.to_string()
                }))
            }
        }
    }
}
