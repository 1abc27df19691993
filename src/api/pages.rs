// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Static HTML pages

use axum::response::Html;

const INDEX_PAGE: &str = include_str!("../../templates/index.html");
const ABOUT_PAGE: &str = include_str!("../../templates/about.html");

/// GET / - Upload and analysis page
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// GET /tentang - About page
pub async fn about_handler() -> Html<&'static str> {
    Html(ABOUT_PAGE)
}
