// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Report download endpoint module
//!
//! Provides POST /download_report for rendering an analysis summary as PDF.

pub mod handler;
pub mod request;

pub use handler::{download_report_handler, REPORT_FILENAME};
pub use request::ReportRequest;
