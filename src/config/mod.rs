// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Every setting has a working default, so the binary runs without flags or
//! environment. Values can be overridden on the command line, through
//! environment variables or a `.env` file in the working directory.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::vision::detection::YoloConfig;

/// Default model weights, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "best.onnx";

/// Beras Vision Node: rice grain detection and PDF quality reports
#[derive(Parser, Debug, Clone)]
#[command(name = "beras-vision-node")]
#[command(version)]
#[command(about = "Rice grain detection service with PDF quality reports", long_about = None)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to
    #[arg(long, env = "BERAS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(long, env = "BERAS_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Path to the exported detection model (ONNX)
    #[arg(long, env = "BERAS_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// Comma-separated class labels, used when the model carries no `names` metadata
    #[arg(long, env = "BERAS_LABELS", value_delimiter = ',')]
    pub labels: Vec<String>,

    /// Minimum class score for a detection to be reported
    #[arg(long, env = "BERAS_CONFIDENCE", default_value_t = 0.25)]
    pub confidence_threshold: f32,

    /// IoU above which overlapping detections of the same class are suppressed
    #[arg(long, env = "BERAS_IOU", default_value_t = 0.7)]
    pub iou_threshold: f32,

    /// Directory for report images staged during PDF assembly (system temp dir if unset)
    #[arg(long, env = "BERAS_STAGING_DIR")]
    pub staging_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            labels: Vec::new(),
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            staging_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, the environment and the command line
    pub fn load() -> Self {
        // A missing .env file is the normal case
        let _ = dotenv::dotenv();
        Self::parse()
    }

    /// Socket address the server listens on
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }

    /// Directory used for staging report images
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Detector settings derived from this configuration
    pub fn detector_config(&self) -> YoloConfig {
        YoloConfig {
            model_path: self.model_path.clone(),
            fallback_labels: self
                .labels
                .iter()
                .map(|label| label.trim().to_string())
                .filter(|label| !label.is_empty())
                .collect(),
            confidence_threshold: self.confidence_threshold.clamp(0.0, 1.0),
            iou_threshold: self.iou_threshold.clamp(0.0, 1.0),
            ..YoloConfig::default()
        }
    }
}
