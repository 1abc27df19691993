// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO detection model running on ONNX Runtime
//!
//! Loads weights exported to ONNX (e.g. `yolo export format=onnx`) and runs
//! letterbox → inference → decode → NMS for a single image.

use anyhow::{Context, Result};
use image::DynamicImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::labels::ClassLabels;
use super::postprocessing::{decode_predictions, non_max_suppression, round5, scale_to_original};
use super::preprocessing::{letterbox, YOLO_INPUT_SIZE};
use super::{BoundingBox, DetectError, Detection, ObjectDetector};

/// Settings for loading and running a YOLO model
#[derive(Debug, Clone)]
pub struct YoloConfig {
    /// Path to the ONNX model file
    pub model_path: PathBuf,
    /// Labels used when the model has no `names` metadata
    pub fallback_labels: Vec<String>,
    /// Square input size the model was exported with
    pub input_size: u32,
    /// Minimum class score for a detection
    pub confidence_threshold: f32,
    /// IoU threshold for same-class suppression
    pub iou_threshold: f32,
    /// Maximum detections per image
    pub max_detections: usize,
    /// Intra-op threads for ONNX Runtime
    pub intra_threads: usize,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("best.onnx"),
            fallback_labels: Vec::new(),
            input_size: YOLO_INPUT_SIZE,
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
            intra_threads: 4,
        }
    }
}

/// YOLO object detection model
///
/// Runs on CPU. The session is shared behind a mutex, so concurrent
/// requests run inference one at a time.
#[derive(Clone)]
pub struct YoloDetector {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Class names
    labels: ClassLabels,
    config: YoloConfig,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("labels", &self.labels)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the detection model described by `config`
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub fn load(config: YoloConfig) -> Result<Self> {
        let model_path: &Path = &config.model_path;

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!(
                    "Failed to load detection model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let labels = Self::resolve_labels(&session, &config.fallback_labels);
        if labels.is_empty() {
            warn!("No class names in model metadata or configuration, using class_<n>");
        }

        debug!(
            "Detection model loaded - input: {}, classes: {}",
            input_name,
            labels.len()
        );

        info!("✅ Detection model loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            labels,
            config,
        })
    }

    fn resolve_labels(session: &Session, fallback: &[String]) -> ClassLabels {
        let from_metadata = session
            .metadata()
            .ok()
            .and_then(|metadata| metadata.custom("names").ok().flatten())
            .and_then(|raw| ClassLabels::from_metadata(&raw));

        match from_metadata {
            Some(labels) => labels,
            None => ClassLabels::new(fallback.to_vec()),
        }
    }

    /// Class names used in detection records
    pub fn labels(&self) -> &ClassLabels {
        &self.labels
    }
}

impl ObjectDetector for YoloDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, DetectError> {
        let letterboxed = letterbox(image, self.config.input_size);

        let input_value = Value::from_array(letterboxed.tensor.clone())
            .map_err(|e| DetectError::Inference(format!("Failed to create input tensor: {}", e)))?;

        let candidates = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| DetectError::Inference("Detection session poisoned".to_string()))?;

            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .map_err(|e| DetectError::Inference(e.to_string()))?;

            let output_tensor = outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| DetectError::Inference(format!("Failed to extract output: {}", e)))?;

            debug!("Detection output shape: {:?}", output_tensor.shape());

            decode_predictions(output_tensor.view(), self.config.confidence_threshold)
                .map_err(|e| DetectError::Inference(e.to_string()))?
        };

        let kept = non_max_suppression(
            candidates,
            self.config.iou_threshold,
            self.config.max_detections,
        );

        let detections: Vec<Detection> = kept
            .iter()
            .map(|candidate| {
                let b = scale_to_original(&candidate.bbox, &letterboxed);
                Detection {
                    name: self.labels.name(candidate.class_id),
                    class: candidate.class_id,
                    confidence: round5(candidate.score.clamp(0.0, 1.0)),
                    bounding_box: BoundingBox {
                        x1: round5(b.x1),
                        y1: round5(b.y1),
                        x2: round5(b.x2),
                        y2: round5(b.y2),
                    },
                }
            })
            .collect();

        debug!("Detected {} objects", detections.len());

        Ok(detections)
    }
}
