// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Report endpoint tests for POST /download_report
//!
//! These tests verify that the report handler:
//! - Returns a PDF attachment for complete and empty requests
//! - Renders counts in request order with humanized labels
//! - Converts every failure into 500 with a generic message
//! - Leaves no staged image files behind on success or failure

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use beras_vision_node::{
    api::http_server::{create_app, AppState},
    report::ReportAssembler,
    vision::DetectorService,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

/// Helper: state staging report images in `dir`
fn setup_state(dir: &TempDir) -> Arc<AppState> {
    Arc::new(AppState::new(
        DetectorService::unavailable("not needed for reports"),
        ReportAssembler::new(dir.path()),
    ))
}

fn data_url(image: DynamicImage, format: ImageFormat, media_type: &str) -> String {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

fn detection_image_url() -> String {
    data_url(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([200, 190, 170]))),
        ImageFormat::Png,
        "image/png",
    )
}

fn chart_image_url() -> String {
    data_url(
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 30, Rgba([90, 125, 42, 128]))),
        ImageFormat::Png,
        "image/png",
    )
}

fn report_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/download_report")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}

fn staged_files(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn assert_report_failure(dir: &TempDir, body: String) {
    let app = create_app(setup_state(dir));

    let response = app.oneshot(report_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json, json!({"error": "Gagal membuat laporan PDF"}));
}

/// Test 1: Complete request returns a PDF attachment
#[tokio::test]
async fn test_report_complete_request() {
    let dir = TempDir::new().unwrap();
    let app = create_app(setup_state(&dir));

    let body = json!({
        "grade": "Medium",
        "advice": "Periksa pengaturan mesin penggiling.",
        "counts": {"broken-rice": 3, "whole-rice": 7},
        "total": 10,
        "image_data": detection_image_url(),
        "chart_data": chart_image_url(),
    });

    let response = app.oneshot(report_request(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("laporan_deteksi_beras.pdf"));

    let pdf = body_bytes(response).await;
    assert!(pdf.starts_with(b"%PDF-"));
    assert!(contains(&pdf, "Laporan Analisis Kualitas Beras"));
    assert!(contains(&pdf, "- Total Objek Terdeteksi: 10"));
    assert!(contains(&pdf, "- Broken Rice: 3 buah"));
    assert!(contains(&pdf, "- Whole Rice: 7 buah"));
    assert!(contains(&pdf, "Distribusi Kualitas"));
    assert!(contains(&pdf, "Gambar Hasil Deteksi"));

    let broken = pdf
        .windows(11)
        .position(|w| w == b"Broken Rice")
        .unwrap();
    let whole = pdf.windows(10).position(|w| w == b"Whole Rice").unwrap();
    assert!(broken < whole, "counts should keep request order");

    assert_eq!(staged_files(&dir), 0, "staged images should be removed");
}

/// Test 2: Empty object uses defaults and omits image sections
#[tokio::test]
async fn test_report_defaults() {
    let dir = TempDir::new().unwrap();
    let app = create_app(setup_state(&dir));

    let response = app.oneshot(report_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let pdf = body_bytes(response).await;
    assert!(contains(&pdf, "- Total Objek Terdeteksi: 0"));
    assert!(contains(&pdf, "N/A"));
    assert!(contains(&pdf, "Tidak ada saran."));
    assert!(!contains(&pdf, "Distribusi Kualitas"));
    assert!(!contains(&pdf, "Gambar Hasil Deteksi"));
}

/// Test 3: Malformed JSON returns 500
#[tokio::test]
async fn test_report_malformed_json() {
    let dir = TempDir::new().unwrap();
    assert_report_failure(&dir, "{not json".to_string()).await;
}

/// Test 4: Non-mapping counts return 500
#[tokio::test]
async fn test_report_counts_not_mapping() {
    let dir = TempDir::new().unwrap();
    assert_report_failure(&dir, json!({"counts": [3, 7]}).to_string()).await;
}

/// Test 5: Embedded image without separator returns 500
#[tokio::test]
async fn test_report_image_without_separator() {
    let dir = TempDir::new().unwrap();
    assert_report_failure(&dir, json!({"image_data": "iVBORw0KGgo"}).to_string()).await;
    assert_eq!(staged_files(&dir), 0);
}

/// Test 6: Invalid base64 payload returns 500
#[tokio::test]
async fn test_report_invalid_base64() {
    let dir = TempDir::new().unwrap();
    assert_report_failure(
        &dir,
        json!({"chart_data": "data:image/png;base64,%%%not-base64%%%"}).to_string(),
    )
    .await;
    assert_eq!(staged_files(&dir), 0);
}

/// Test 7: Payload that is not an image fails after staging and is cleaned up
#[tokio::test]
async fn test_report_undecodable_image_cleans_up() {
    let dir = TempDir::new().unwrap();
    let payload = STANDARD.encode(b"definitely not a picture");
    assert_report_failure(
        &dir,
        json!({
            "chart_data": chart_image_url(),
            "image_data": format!("data:image/png;base64,{}", payload),
        })
        .to_string(),
    )
    .await;

    assert_eq!(staged_files(&dir), 0, "staged images should be removed");
}

/// Test 8: Many classes spill onto a second page
#[tokio::test]
async fn test_report_long_summary_spans_pages() {
    let dir = TempDir::new().unwrap();
    let app = create_app(setup_state(&dir));

    let counts: serde_json::Map<String, Value> = (0..40)
        .map(|i| (format!("class-{}", i), json!(i)))
        .collect();
    let body = json!({"counts": counts, "total": 780});

    let response = app.oneshot(report_request(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let pdf = body_bytes(response).await;
    assert!(contains(&pdf, "/Count 2"));
    assert!(contains(&pdf, "- Class 39: 39 buah"));
}

/// Test 9: JSON bodies that are not objects return 500
#[tokio::test]
async fn test_report_body_not_object() {
    let dir = TempDir::new().unwrap();
    assert_report_failure(&dir, "[]".to_string()).await;
    assert_report_failure(&dir, json!(["Premium", "Simpan"]).to_string()).await;
    assert_eq!(staged_files(&dir), 0);
}
