// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection API endpoint module
//!
//! Provides POST /predict for detecting rice grains in an uploaded image.

pub mod handler;

pub use handler::{predict_handler, IMAGE_FIELD};
