// src/handlers.rs
use crate::{AppState, errors::HuematchError, models::*, services::ContentStore};
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures_util::TryStreamExt;
use std::time::Instant;
use uuid::Uuid;

pub async fn create_analysis(
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    // one photo per request; the first field wins
    let mut field = match payload.try_next().await? {
        Some(field) => field,
        None => {
            return Err(HuematchError::Validation("No photo in upload".to_string()).into());
        }
    };

    let filename = field
        .content_disposition()
        .get_filename()
        .unwrap_or_default()
        .to_string();

    let content_type = field
        .content_type()
        .map(|ct| ct.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    // Collect photo data
    let mut photo_data = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        photo_data.extend_from_slice(&chunk);
    }

    // File preconditions run against the raw upload, before any
    // network traffic
    data.photo_processor
        .validate_upload(&filename, &content_type, photo_data.len())?;

    let processed = data.photo_processor.prepare(&photo_data);

    let photo = StoredPhoto {
        id: Uuid::new_v4(),
        filename,
        content_type,
        size: processed.len(),
        data: processed,
        uploaded_at: chrono::Utc::now(),
    };
    let photo_id = photo.id;

    let started = Instant::now();
    let analysis = data.analysis_service.analyze_photo(&photo).await?;

    let record = AnalysisRecord {
        id: Uuid::new_v4(),
        photo_id,
        analysis,
        processing_time_ms: started.elapsed().as_millis() as u64,
        model_used: data.analysis_service.model_name().to_string(),
        created_at: chrono::Utc::now(),
    };

    data.store.put_analysis(&record).await?;

    Ok(HttpResponse::Ok().json(&record))
}

pub async fn get_analysis(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let analysis_id = path.into_inner();

    let record = data
        .store
        .get_analysis(&analysis_id)
        .await
        .map_err(|e| actix_web::error::ErrorNotFound(e))?;

    Ok(HttpResponse::Ok().json(&record))
}

// Backs the public photo URL handed to the vision provider. The route
// is registered for GET and HEAD; the reachability check sends HEAD.
pub async fn get_photo(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let photo_id = path.into_inner();

    let photo = data
        .store
        .get_photo(&photo_id)
        .await
        .map_err(|e| actix_web::error::ErrorNotFound(e))?;

    Ok(HttpResponse::Ok()
        .content_type(photo.content_type)
        .body(photo.data))
}
