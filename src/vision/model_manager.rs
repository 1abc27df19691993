// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide detection service
//!
//! Built once at startup and shared read-only by every request. A model that
//! fails to load does not stop the server: the service becomes
//! [`DetectorService::Unavailable`] and detection calls fail with
//! [`DetectError::ModelUnavailable`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::detection::{DetectError, Detection, ObjectDetector, YoloConfig, YoloDetector};
use super::image_utils::decode_image_bytes;

/// The loaded detection model, or the reason it is missing
#[derive(Clone)]
pub enum DetectorService {
    Ready(Arc<dyn ObjectDetector>),
    Unavailable { reason: String },
}

impl std::fmt::Debug for DetectorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorService::Ready(_) => f.write_str("DetectorService::Ready"),
            DetectorService::Unavailable { reason } => f
                .debug_struct("DetectorService::Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

impl DetectorService {
    /// Load the YOLO model, degrading to `Unavailable` on any failure
    pub fn load(config: YoloConfig) -> Self {
        let path = config.model_path.display().to_string();
        match YoloDetector::load(config) {
            Ok(detector) => {
                info!("✅ Detection model ready ({} classes)", detector.labels().len());
                Self::ready(Arc::new(detector))
            }
            Err(e) => {
                warn!("⚠️ Failed to load detection model from {}: {:#}", path, e);
                warn!("   /predict will return 500 until the model is available");
                Self::unavailable(format!("{:#}", e))
            }
        }
    }

    pub fn ready(detector: Arc<dyn ObjectDetector>) -> Self {
        DetectorService::Ready(detector)
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        DetectorService::Unavailable {
            reason: reason.into(),
        }
    }

    /// Check if detection is available
    pub fn is_available(&self) -> bool {
        matches!(self, DetectorService::Ready(_))
    }

    /// Get the detector if available
    pub fn detector(&self) -> Result<Arc<dyn ObjectDetector>, DetectError> {
        match self {
            DetectorService::Ready(detector) => Ok(detector.clone()),
            DetectorService::Unavailable { reason } => {
                Err(DetectError::ModelUnavailable(reason.clone()))
            }
        }
    }

    /// Decode uploaded bytes and run one inference on the blocking pool
    pub async fn detect_bytes(&self, bytes: Vec<u8>) -> Result<Vec<Detection>, DetectError> {
        let detector = self.detector()?;

        tokio::task::spawn_blocking(move || {
            let (image, info) = decode_image_bytes(&bytes)?;
            debug!(
                "Decoded image: {}x{}, {} bytes",
                info.width, info.height, info.size_bytes
            );
            detector.detect(&image)
        })
        .await
        .map_err(|e| DetectError::Inference(format!("Detection task failed: {}", e)))?
    }
}
