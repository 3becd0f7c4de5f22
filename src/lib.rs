// src/lib.rs
use std::sync::Arc;

pub mod color;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

use crate::services::{AnalysisService, ContentStore, PhotoProcessor};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub analysis_service: Arc<AnalysisService>,
    pub photo_processor: Arc<PhotoProcessor>,
}
