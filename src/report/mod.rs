// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Rice quality PDF reports
//!
//! A report is laid out with [`layout::Layout`], embedded images are staged
//! on disk for the duration of one build, and the result is serialized with
//! `pdf-writer`.

pub mod assembler;
pub mod layout;
pub mod text;
pub mod writer;

use thiserror::Error;

use crate::vision::{EncodedImage, ImageError};

pub use assembler::ReportAssembler;
pub use layout::{Document, RasterImage};
pub use text::humanize_label;

pub const DEFAULT_GRADE: &str = "N/A";
pub const DEFAULT_ADVICE: &str = "Tidak ada saran.";

/// Count of detections for one class label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCount {
    pub label: String,
    pub count: u64,
}

impl ClassCount {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Everything a quality report shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub grade: String,
    pub advice: String,
    /// Per-class counts in display order
    pub counts: Vec<ClassCount>,
    pub total: u64,
    /// Annotated detection result
    pub detection_image: Option<EncodedImage>,
    /// Class distribution chart
    pub chart_image: Option<EncodedImage>,
}

impl Default for AnalysisReport {
    fn default() -> Self {
        Self {
            grade: DEFAULT_GRADE.to_string(),
            advice: DEFAULT_ADVICE.to_string(),
            counts: Vec::new(),
            total: 0,
            detection_image: None,
            chart_image: None,
        }
    }
}

/// Report rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid embedded image: {0}")]
    Asset(#[from] ImageError),

    #[error("Failed to stage image: {0}")]
    Staging(#[source] std::io::Error),

    #[error("Failed to read staged image: {0}")]
    Image(String),

    #[error("Failed to write document: {0}")]
    Write(#[source] std::io::Error),
}
