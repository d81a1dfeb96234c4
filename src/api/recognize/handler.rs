// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recognition endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::MultipartRejection;
use axum_extra::extract::Multipart;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use super::request::read_image_field;
use super::response::RecognitionResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// Languages used when a request has to build the engine itself
pub const DEFAULT_LANGUAGES: &[&str] = &["en"];

/// POST /recognize - Extract words from an uploaded image
///
/// Expects a multipart form with a file field named `image`.
///
/// # Response
/// - `text`: All recognized strings joined by single spaces
/// - `words`: Each region's `text`, `confidence`, and `bbox` (`x0`, `y0`, `x1`, `y1`)
///
/// # Errors
/// - 400 Bad Request: no `image` file field, empty filename, unreadable body
/// - 500 Internal Server Error: staging, engine, or conversion failed
pub async fn recognize_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecognitionResponse>, ApiError> {
    let multipart = multipart.map_err(|e| {
        debug!("Request body is not multipart: {}", e);
        ApiError::NoImageProvided
    })?;

    let upload = read_image_field(multipart).await.map_err(|e| {
        warn!("Recognition request rejected: {}", e);
        e
    })?;
    debug!(
        "Received upload '{}' ({} bytes)",
        upload.filename,
        upload.bytes.len()
    );

    let staged = state
        .staging
        .stage(&upload.filename, &upload.bytes)
        .await
        .map_err(|e| {
            error!("Error processing image: {}", e);
            ApiError::Processing(e.to_string())
        })?;

    let result = recognize_staged(&state, staged.path().to_path_buf()).await;
    staged.cleanup().await;

    match result {
        Ok(response) => {
            info!("Recognized {} words", response.words.len());
            Ok(Json(response))
        }
        Err(e) => {
            error!("Error processing image: {}", e);
            Err(e)
        }
    }
}

async fn recognize_staged(state: &AppState, path: PathBuf) -> Result<RecognitionResponse, ApiError> {
    let languages: Vec<String> = DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect();
    let engine = state.engine.get_engine(&languages).await?;

    let regions = tokio::task::spawn_blocking(move || engine.read_text(&path))
        .await
        .map_err(|e| ApiError::Processing(format!("OCR task failed: {}", e)))??;

    Ok(RecognitionResponse::from_regions(&regions))
}
