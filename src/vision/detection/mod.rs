// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection over uploaded images
//!
//! Components:
//! - `preprocessing` - Letterbox resize into the model's square input tensor
//! - `postprocessing` - Candidate decoding, NMS and mapping back to image space
//! - `labels` - Class names from model metadata or configuration
//! - `yolo` - ONNX Runtime session wrapper for exported YOLO weights

pub mod labels;
pub mod postprocessing;
pub mod preprocessing;
pub mod yolo;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::image_utils::ImageError;

pub use labels::ClassLabels;
pub use yolo::{YoloConfig, YoloDetector};

/// Bounding box corners in pixel coordinates of the submitted image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

/// One detected object
///
/// Serialized as `{"name", "class", "confidence", "box": {"x1", "y1", "x2", "y2"}}`,
/// the record shape clients of the detection route consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class label
    pub name: String,
    /// Class index in the model's label table
    pub class: usize,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Bounding box location
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
}

/// Errors produced by the detection pipeline
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Detection model unavailable: {0}")]
    ModelUnavailable(String),

    #[error(transparent)]
    Decode(#[from] ImageError),

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// A loaded detection model
///
/// Implementations are shared read-only across requests. Ordering of the
/// returned detections is implementation defined.
#[cfg_attr(test, mockall::automock)]
pub trait ObjectDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, DetectError>;
}
