// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod download_report;
pub mod errors;
pub mod http_server;
pub mod pages;
pub mod predict;

pub use download_report::{download_report_handler, ReportRequest};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState};
pub use predict::predict_handler;
