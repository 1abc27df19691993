// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - Rice grain detection via an exported YOLO model
//! - Decoding of uploaded and embedded (data URL) images
//! - Request-scoped staging of decoded images on disk

pub mod detection;
pub mod encoded_image;
pub mod image_utils;
pub mod model_manager;
pub mod staging;

pub use detection::{
    BoundingBox, DetectError, Detection, ObjectDetector, YoloConfig, YoloDetector,
};
pub use encoded_image::EncodedImage;
pub use image_utils::{decode_image_bytes, ImageError, ImageInfo};
pub use model_manager::DetectorService;
pub use staging::{materialize_to_temp, StagedAsset};
