// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::api::errors::{ApiError, MISSING_IMAGE_MESSAGE};
use crate::api::http_server::AppState;
use crate::vision::Detection;

/// Multipart field carrying the uploaded image
pub const IMAGE_FIELD: &str = "image";

/// POST /predict - Detect rice grains in an uploaded image
///
/// # Request
/// `multipart/form-data` with the image file in the `image` field.
///
/// # Response
/// JSON array of detections, each with `name`, `class`, `confidence` and
/// `box` (`x1`, `y1`, `x2`, `y2` in original image pixels).
///
/// # Errors
/// - 500 Internal Server Error: detection model not loaded (checked first)
/// - 400 Bad Request: no `image` field
/// - 500 Internal Server Error: image could not be decoded or inference failed
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<Detection>>, ApiError> {
    if !state.detector.is_available() {
        warn!("Detection requested but model is not loaded");
        return Err(ApiError::ModelUnavailable);
    }

    let upload = match multipart {
        Ok(multipart) => read_image_field(multipart).await?,
        Err(rejection) => {
            debug!("Request is not multipart: {}", rejection);
            None
        }
    };

    let bytes = upload.ok_or_else(|| {
        warn!("Detection request without '{}' field", IMAGE_FIELD);
        ApiError::MissingInput(MISSING_IMAGE_MESSAGE.to_string())
    })?;

    debug!("Received image upload: {} bytes", bytes.len());

    let start = Instant::now();
    let detections = state.detector.detect_bytes(bytes.to_vec()).await?;

    info!(
        "Detection complete: {} objects in {}ms",
        detections.len(),
        start.elapsed().as_millis()
    );

    Ok(Json(detections))
}

async fn read_image_field(mut multipart: Multipart) -> Result<Option<Bytes>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::DecodeError(e.to_string()))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::DecodeError(e.to_string()))?;
            return Ok(Some(bytes));
        }
    }

    Ok(None)
}
