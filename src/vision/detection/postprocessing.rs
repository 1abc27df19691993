// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO output decoding and non-maximum suppression
//!
//! Exported detection heads emit `[1, 4 + nc, N]`: per anchor a centre/size
//! box followed by one score per class. Some exports transpose this to
//! `[1, N, 4 + nc]`; the layout is recognised by the anchor axis being the
//! longer one.

use anyhow::Result;
use ndarray::{ArrayViewD, Axis, Ix2};

use super::preprocessing::Letterbox;
use super::BoundingBox;

/// A scored box in letterboxed tensor space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub score: f32,
    pub bbox: BoundingBox,
}

/// Decode raw head output into candidates scoring at least `confidence_threshold`
pub fn decode_predictions(
    output: ArrayViewD<f32>,
    confidence_threshold: f32,
) -> Result<Vec<Candidate>> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 {
        anyhow::bail!(
            "Unexpected output shape: {:?}, expected [1, 4 + nc, N]",
            shape
        );
    }

    let predictions = output
        .index_axis(Axis(0), 0)
        .into_dimensionality::<Ix2>()?;

    // Rows are attributes (4 + nc) unless the anchor axis comes first
    let predictions = if shape[1] > shape[2] {
        predictions.reversed_axes()
    } else {
        predictions
    };

    let attributes = predictions.nrows();
    if attributes <= 4 {
        anyhow::bail!("Output has no class scores: {:?}", shape);
    }

    let mut candidates = Vec::new();
    for anchor in predictions.axis_iter(Axis(1)) {
        let (class_id, score) = anchor
            .iter()
            .skip(4)
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (id, s)| {
                if s > best.1 {
                    (id, s)
                } else {
                    best
                }
            });

        if score < confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (anchor[0], anchor[1], anchor[2], anchor[3]);
        candidates.push(Candidate {
            class_id,
            score,
            bbox: BoundingBox {
                x1: cx - w / 2.0,
                y1: cy - h / 2.0,
                x2: cx + w / 2.0,
                y2: cy + h / 2.0,
            },
        });
    }

    Ok(candidates)
}

/// Intersection over union of two boxes
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);

    let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    let union = a.area() + b.area() - intersection;

    if union <= 0.0 {
        0.0
    } else {
        intersection / union
    }
}

/// Class-aware non-maximum suppression
///
/// Returns at most `max_detections` candidates in descending score order.
/// Boxes of different classes never suppress each other.
pub fn non_max_suppression(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }

        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && iou(&k.bbox, &candidate.bbox) > iou_threshold
        });

        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}

/// Map a tensor-space box back onto the original image
pub fn scale_to_original(bbox: &BoundingBox, letterbox: &Letterbox) -> BoundingBox {
    let (x1, y1) = letterbox.to_original(bbox.x1, bbox.y1);
    let (x2, y2) = letterbox.to_original(bbox.x2, bbox.y2);
    BoundingBox { x1, y1, x2, y2 }
}

/// Round to five decimals, the precision of serialized detection records
pub fn round5(value: f32) -> f32 {
    (value * 100_000.0).round() / 100_000.0
}
