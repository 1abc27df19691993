// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLO detection

use image::{imageops::FilterType, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input size of exported YOLO models
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Padding colour used by the exporter's letterbox
pub const PAD_VALUE: u8 = 114;

/// A letterboxed input tensor plus the transform needed to undo it
#[derive(Debug, Clone)]
pub struct Letterbox {
    /// NCHW tensor [1, 3, size, size], RGB scaled to [0, 1]
    pub tensor: Array4<f32>,
    /// Scale applied to the original image
    pub scale: f32,
    /// Horizontal padding (left) in tensor pixels
    pub pad_x: f32,
    /// Vertical padding (top) in tensor pixels
    pub pad_y: f32,
    /// Original image width
    pub orig_w: u32,
    /// Original image height
    pub orig_h: u32,
}

impl Letterbox {
    /// Map a point from tensor space back to original image space, clamped to the image
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let ox = ((x - self.pad_x) / self.scale).clamp(0.0, self.orig_w as f32);
        let oy = ((y - self.pad_y) / self.scale).clamp(0.0, self.orig_h as f32);
        (ox, oy)
    }
}

/// Preprocess an image for YOLO detection
///
/// Steps:
/// 1. Resize with aspect ratio preservation to fit `size` x `size`
/// 2. Pad to square with gray (114), image centred
/// 3. Scale RGB to [0, 1]
/// 4. Convert to NCHW tensor format [1, 3, size, size]
pub fn letterbox(image: &DynamicImage, size: u32) -> Letterbox {
    let (orig_w, orig_h) = image.dimensions();
    let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_VALUE; 3]));

    // Handle edge cases
    if orig_w == 0 || orig_h == 0 {
        return Letterbox {
            tensor: to_tensor(&canvas),
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            orig_w,
            orig_h,
        };
    }

    let scale = (size as f32 / orig_w as f32).min(size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, size);

    let pad_x = (size - new_w) as f32 / 2.0;
    let pad_y = (size - new_h) as f32 / 2.0;
    let left = (pad_x - 0.1).round().max(0.0) as u32;
    let top = (pad_y - 0.1).round().max(0.0) as u32;

    let resized = if new_w == orig_w && new_h == orig_h {
        image.to_rgb8()
    } else {
        image
            .resize_exact(new_w, new_h, FilterType::Triangle)
            .to_rgb8()
    };

    image::imageops::replace(&mut canvas, &resized, left as i64, top as i64);

    Letterbox {
        tensor: to_tensor(&canvas),
        scale,
        pad_x: left as f32,
        pad_y: top as f32,
        orig_w,
        orig_h,
    }
}

fn to_tensor(rgb: &RgbImage) -> Array4<f32> {
    let (width, height) = rgb.dimensions();
    let mut tensor = Array4::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    tensor
}
