// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use crate::report::RenderError;
use crate::vision::DetectError;

pub const MODEL_UNAVAILABLE_MESSAGE: &str = "Model deteksi tidak dapat dimuat.";
pub const MISSING_IMAGE_MESSAGE: &str = "Tidak ada file gambar";
pub const REPORT_FAILED_MESSAGE: &str = "Gagal membuat laporan PDF";

/// JSON body of every error response: `{"error": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// Detection model failed to load at startup
    ModelUnavailable,
    /// Required request field absent
    MissingInput(String),
    /// Uploaded image could not be processed
    DecodeError(String),
    /// Report could not be produced
    RenderError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            ApiError::ModelUnavailable => MODEL_UNAVAILABLE_MESSAGE.to_string(),
            ApiError::MissingInput(msg) => msg.clone(),
            ApiError::DecodeError(detail) => processing_failure(detail),
            ApiError::RenderError(_) => REPORT_FAILED_MESSAGE.to_string(),
        };

        ErrorResponse { error }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::MissingInput(_) => 400,
            ApiError::ModelUnavailable
            | ApiError::DecodeError(_)
            | ApiError::RenderError(_) => 500,
        }
    }
}

fn processing_failure(detail: &str) -> String {
    format!("Terjadi kesalahan saat memproses gambar: {}", detail)
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ModelUnavailable => write!(f, "Detection model unavailable"),
            ApiError::MissingInput(msg) => write!(f, "Missing input: {}", msg),
            ApiError::DecodeError(msg) => write!(f, "Image processing failed: {}", msg),
            ApiError::RenderError(msg) => write!(f, "Report rendering failed: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DetectError> for ApiError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::ModelUnavailable(_) => ApiError::ModelUnavailable,
            other => ApiError::DecodeError(other.to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::RenderError(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!("{}", self);
        }

        (status, Json(self.to_response())).into_response()
    }
}
