// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod report;
pub mod version;
pub mod vision;

pub use api::http_server::{create_app, start_server, AppState};
pub use config::ServerConfig;
pub use report::{AnalysisReport, RenderError, ReportAssembler};
pub use vision::{Detection, DetectorService, EncodedImage, ImageError};
