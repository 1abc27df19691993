// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detection endpoint tests for POST /predict
//!
//! These tests verify that the predict handler:
//! - Reports an unavailable model before looking at the request
//! - Rejects requests without an `image` field with 400
//! - Returns detection records in the documented JSON shape
//! - Converts decode failures into 500 with the failure detail

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use beras_vision_node::{
    api::http_server::{create_app, AppState},
    report::ReportAssembler,
    vision::{BoundingBox, DetectError, Detection, DetectorService, ObjectDetector},
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

const BOUNDARY: &str = "beras-test-boundary";

/// Detector returning a fixed set of detections
struct StubDetector {
    detections: Vec<Detection>,
}

impl ObjectDetector for StubDetector {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>, DetectError> {
        Ok(self.detections.clone())
    }
}

fn sample_detections() -> Vec<Detection> {
    vec![
        Detection {
            name: "whole-rice".to_string(),
            class: 1,
            confidence: 0.91,
            bounding_box: BoundingBox {
                x1: 1.5,
                y1: 2.0,
                x2: 6.25,
                y2: 7.0,
            },
        },
        Detection {
            name: "broken-rice".to_string(),
            class: 0,
            confidence: 0.5,
            bounding_box: BoundingBox {
                x1: 0.0,
                y1: 0.0,
                x2: 3.0,
                y2: 3.0,
            },
        },
    ]
}

fn state_with_detections(detections: Vec<Detection>) -> AppState {
    AppState::new(
        DetectorService::ready(Arc::new(StubDetector { detections })),
        ReportAssembler::default(),
    )
}

fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([220, 210, 190])));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn multipart_body(field: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"beras.png\"\r\nContent-Type: image/png\r\n\r\n",
            BOUNDARY, field
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn predict_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Test 1: Unavailable model returns 500 with the model error
#[tokio::test]
async fn test_predict_model_unavailable() {
    let app = create_app(Arc::new(AppState::new_for_test()));

    let response = app
        .oneshot(predict_request(multipart_body("image", &png_bytes())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Model deteksi tidak dapat dimuat."})
    );
}

/// Test 2: Model availability is checked before the image field
#[tokio::test]
async fn test_predict_model_unavailable_without_image() {
    let app = create_app(Arc::new(AppState::new_for_test()));

    let response = app
        .oneshot(predict_request(multipart_body("file", &png_bytes())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await["error"],
        "Model deteksi tidak dapat dimuat."
    );
}

/// Test 3: Missing image field returns 400
#[tokio::test]
async fn test_predict_missing_image_field() {
    let app = create_app(Arc::new(state_with_detections(sample_detections())));

    let response = app
        .oneshot(predict_request(multipart_body("file", &png_bytes())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Tidak ada file gambar"})
    );
}

/// Test 4: Non-multipart request has no image field
#[tokio::test]
async fn test_predict_non_multipart_request() {
    let app = create_app(Arc::new(state_with_detections(sample_detections())));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"image": "abc"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Tidak ada file gambar");
}

/// Test 5: Valid image returns detection records
#[tokio::test]
async fn test_predict_returns_detections() {
    let app = create_app(Arc::new(state_with_detections(sample_detections())));

    let response = app
        .oneshot(predict_request(multipart_body("image", &png_bytes())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let detections = body.as_array().expect("response should be an array");
    assert_eq!(detections.len(), 2);

    let first = &detections[0];
    assert_eq!(first["name"], "whole-rice");
    assert_eq!(first["class"], 1);
    assert!((first["confidence"].as_f64().unwrap() - 0.91).abs() < 1e-6);
    assert_eq!(first["box"], json!({"x1": 1.5, "y1": 2.0, "x2": 6.25, "y2": 7.0}));
}

/// Test 6: No detections is an empty array, not an error
#[tokio::test]
async fn test_predict_empty_result() {
    let app = create_app(Arc::new(state_with_detections(Vec::new())));

    let response = app
        .oneshot(predict_request(multipart_body("image", &png_bytes())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}

/// Test 7: Undecodable upload returns 500 with the failure detail
#[tokio::test]
async fn test_predict_undecodable_image() {
    let app = create_app(Arc::new(state_with_detections(sample_detections())));

    let response = app
        .oneshot(predict_request(multipart_body("image", b"this is not an image")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Terjadi kesalahan saat memproses gambar: "));
    assert!(message.len() > "Terjadi kesalahan saat memproses gambar: ".len());
}

/// Test 8: Empty upload returns 500
#[tokio::test]
async fn test_predict_empty_image() {
    let app = create_app(Arc::new(state_with_detections(sample_detections())));

    let response = app
        .oneshot(predict_request(multipart_body("image", b"")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await["error"],
        "Terjadi kesalahan saat memproses gambar: Image data is empty"
    );
}

/// Test 9: GET is not allowed on /predict
#[tokio::test]
async fn test_predict_rejects_get() {
    let app = create_app(Arc::new(state_with_detections(sample_detections())));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/predict")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
