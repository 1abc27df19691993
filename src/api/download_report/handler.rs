// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Report download endpoint handler

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::{debug, info, warn};

use super::request::ReportRequest;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// Attachment name offered to the browser
pub const REPORT_FILENAME: &str = "laporan_deteksi_beras.pdf";

/// POST /download_report - Render an analysis summary as a PDF attachment
///
/// # Request
/// JSON object with optional `grade`, `advice`, `counts`, `total`,
/// `image_data` and `chart_data` (data URLs).
///
/// # Errors
/// - 500 Internal Server Error: malformed body, invalid embedded image or
///   rendering failure, always reported as `Gagal membuat laporan PDF`
pub async fn download_report_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    debug!("Report request received: {} bytes", body.len());

    let report = ReportRequest::from_slice(&body)
        .and_then(ReportRequest::into_report)
        .map_err(|e| {
            warn!("Rejected report request: {}", e);
            e
        })?;

    debug!(
        "Report: grade={}, {} classes, total={}, chart={}, image={}",
        report.grade,
        report.counts.len(),
        report.total,
        report.chart_image.is_some(),
        report.detection_image.is_some()
    );

    let start = Instant::now();
    let assembler = state.assembler.clone();
    let pdf = tokio::task::spawn_blocking(move || assembler.build(&report))
        .await
        .map_err(|e| ApiError::RenderError(format!("Report task failed: {}", e)))??;

    info!(
        "Report generated: {} bytes in {}ms",
        pdf.len(),
        start.elapsed().as_millis()
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", REPORT_FILENAME),
            ),
        ],
        pdf,
    )
        .into_response())
}
