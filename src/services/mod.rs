// src/services/mod.rs
pub mod analysis_service;
pub mod fallback;
pub mod photo_processor;
pub mod storage_service;
pub mod vision_service;

pub use analysis_service::AnalysisService;
pub use fallback::FallbackGenerator;
pub use photo_processor::PhotoProcessor;
pub use storage_service::{ContentStore, HttpProbe, RedisStore};
pub use vision_service::OpenAiVision;
