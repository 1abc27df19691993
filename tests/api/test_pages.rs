// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Static page route tests

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use beras_vision_node::api::http_server::{create_app, AppState};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

async fn get(uri: &str) -> (StatusCode, Option<String>, String) {
    let app = create_app(Arc::new(AppState::new_for_test()));

    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_index_page() {
    let (status, content_type, body) = get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("/predict"));
    assert!(body.contains("/download_report"));
}

#[tokio::test]
async fn test_about_page() {
    let (status, content_type, body) = get("/tentang").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("Tentang"));
}

#[tokio::test]
async fn test_pages_served_without_model() {
    // Default test state has no detection model loaded
    let (status, _, _) = get("/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _, _) = get("/tidak-ada").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
