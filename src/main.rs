// src/main.rs
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use anyhow::Context;
use log::info;
use std::sync::Arc;

use huematch::AppState;
use huematch::handlers::{create_analysis, get_analysis, get_photo};
use huematch::services::{
    AnalysisService, ContentStore, FallbackGenerator, HttpProbe, OpenAiVision, PhotoProcessor,
    RedisStore,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting huematch service...");

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let public_base_url =
        std::env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| format!("http://{}", bind_addr));
    let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
    let inline_images = std::env::var("VISION_INLINE_IMAGES")
        .map(|v| v == "1")
        .unwrap_or(false);

    // Initialize services
    let store: Arc<dyn ContentStore> =
        Arc::new(RedisStore::new(&redis_url, &public_base_url).await?);
    let analysis_service = Arc::new(AnalysisService::new(
        Arc::new(OpenAiVision::new(api_key, inline_images)),
        store.clone(),
        Arc::new(HttpProbe::new()),
        FallbackGenerator::new(),
    ));
    let photo_processor = Arc::new(PhotoProcessor::new());

    let app_state = AppState {
        store,
        analysis_service,
        photo_processor,
    };

    info!("Starting HTTP server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/api/v1")
                    .route("/analyses", web::post().to(create_analysis))
                    .route("/analyses/{analysis_id}", web::get().to(get_analysis))
                    // the reachability check sends HEAD at this path,
                    // so both methods are registered
                    .route("/photos/{photo_id}", web::get().to(get_photo))
                    .route("/photos/{photo_id}", web::head().to(get_photo)),
            )
            .route("/health", web::get().to(health_check))
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "huematch",
        "version": "0.1.0"
    }))
}
