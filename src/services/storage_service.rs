// src/services/storage_service.rs
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use redis::{AsyncCommands, Client};
use uuid::Uuid;

use crate::errors::HuematchError;
use crate::models::{AnalysisRecord, StoredPhoto};

/// Content store behind the pipeline: photo bytes going in, finished
/// analysis records coming out. `put_photo` returns the public URL the
/// vision provider will fetch the photo from.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn put_photo(&self, photo: &StoredPhoto) -> Result<String, HuematchError>;
    async fn get_photo(&self, photo_id: &Uuid) -> Result<StoredPhoto, HuematchError>;
    async fn put_analysis(&self, record: &AnalysisRecord) -> Result<(), HuematchError>;
    async fn get_analysis(&self, analysis_id: &Uuid) -> Result<AnalysisRecord, HuematchError>;
}

/// HEAD-capable client for the post-upload reachability check.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn head(&self, url: &str) -> Result<u16, HuematchError>;
}

pub struct RedisStore {
    client: Client,
    public_base_url: String,
}

impl RedisStore {
    pub async fn new(redis_url: &str, public_base_url: &str) -> Result<Self, HuematchError> {
        let client = Client::open(redis_url).map_err(|e| HuematchError::Storage(e.to_string()))?;

        // Test connection
        let mut conn = client
            .get_async_connection()
            .await
            .map_err(|e| HuematchError::Storage(e.to_string()))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| HuematchError::Storage(e.to_string()))?;

        Ok(Self {
            client,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn public_url(&self, photo_id: &Uuid) -> String {
        format!("{}/api/v1/photos/{}", self.public_base_url, photo_id)
    }
}

#[async_trait]
impl ContentStore for RedisStore {
    async fn put_photo(&self, photo: &StoredPhoto) -> Result<String, HuematchError> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| HuematchError::Storage(e.to_string()))?;

        let key = format!("photo:{}", photo.id);
        let value = serde_json::to_string(photo)
            .map_err(|e| HuematchError::Serialization(e.to_string()))?;

        // Store with 24 hour expiration
        conn.set_ex::<_, _, ()>(&key, value, 86400)
            .await
            .map_err(|e| HuematchError::Storage(e.to_string()))?;

        Ok(self.public_url(&photo.id))
    }

    async fn get_photo(&self, photo_id: &Uuid) -> Result<StoredPhoto, HuematchError> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| HuematchError::Storage(e.to_string()))?;

        let key = format!("photo:{}", photo_id);
        let value: String = conn
            .get(&key)
            .await
            .map_err(|e| HuematchError::Storage(format!("Photo not found: {}", e)))?;

        serde_json::from_str(&value).map_err(|e| HuematchError::Serialization(e.to_string()))
    }

    async fn put_analysis(&self, record: &AnalysisRecord) -> Result<(), HuematchError> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| HuematchError::Storage(e.to_string()))?;

        let key = format!("analysis:{}", record.id);
        let value = serde_json::to_string(record)
            .map_err(|e| HuematchError::Serialization(e.to_string()))?;

        conn.set_ex::<_, _, ()>(&key, value, 86400)
            .await
            .map_err(|e| HuematchError::Storage(e.to_string()))?;

        // Index by photo
        let photo_key = format!("photo:{}:analyses", record.photo_id);
        conn.sadd::<_, _, ()>(&photo_key, record.id.to_string())
            .await
            .map_err(|e| HuematchError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn get_analysis(&self, analysis_id: &Uuid) -> Result<AnalysisRecord, HuematchError> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| HuematchError::Storage(e.to_string()))?;

        let key = format!("analysis:{}", analysis_id);
        let value: String = conn
            .get(&key)
            .await
            .map_err(|e| HuematchError::Storage(format!("Analysis not found: {}", e)))?;

        serde_json::from_str(&value).map_err(|e| HuematchError::Serialization(e.to_string()))
    }
}

pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReachabilityProbe for HttpProbe {
    async fn head(&self, url: &str) -> Result<u16, HuematchError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| HuematchError::Validation(format!("Reachability check failed: {}", e)))?;
        Ok(response.status().as_u16())
    }
}

const MAX_UPLOAD_ATTEMPTS: u32 = 3;

/// Pushes a photo into the content store with bounded retries.
///
/// A failed attempt `n` waits `2^n` seconds before the next try (2 s
/// then 4 s; nothing after the last). An attempt that yields a URL not
/// starting with `http` counts as a failure too.
pub struct UploadRetrier {
    store: Arc<dyn ContentStore>,
    max_attempts: u32,
}

impl UploadRetrier {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            max_attempts: MAX_UPLOAD_ATTEMPTS,
        }
    }

    pub async fn upload(&self, photo: &StoredPhoto) -> Result<String, HuematchError> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            match self.store.put_photo(photo).await {
                Ok(url) if url.starts_with("http") => {
                    info!(
                        "Uploaded photo {} on attempt {}: {}",
                        photo.id, attempt, url
                    );
                    return Ok(url);
                }
                Ok(url) => {
                    last_error = format!("store returned a non-http URL: {}", url);
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            warn!(
                "Upload attempt {}/{} for photo {} failed: {}",
                attempt, self.max_attempts, photo.id, last_error
            );

            if attempt < self.max_attempts {
                let delay = Duration::from_millis(1000 * 2u64.pow(attempt));
                tokio::time::sleep(delay).await;
            }
        }

        Err(HuematchError::Upload {
            attempts: self.max_attempts,
            message: last_error,
        })
    }
}
