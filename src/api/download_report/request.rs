// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Report request types and conversion

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::errors::ApiError;
use crate::report::{AnalysisReport, ClassCount};
use crate::vision::EncodedImage;

/// Body of POST /download_report
///
/// Every field is optional; absent or `null` fields take report defaults.
/// `counts` keeps the key order of the incoming JSON object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub grade: Option<String>,

    #[serde(default)]
    pub advice: Option<String>,

    /// Class label → count
    #[serde(default)]
    pub counts: Option<Map<String, Value>>,

    #[serde(default)]
    pub total: Option<Value>,

    /// Annotated detection image as a data URL
    #[serde(default)]
    pub image_data: Option<String>,

    /// Distribution chart as a data URL
    #[serde(default)]
    pub chart_data: Option<String>,
}

impl ReportRequest {
    /// Parse a raw request body, which must be a JSON object
    pub fn from_slice(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(invalid_request)?;
        if !value.is_object() {
            return Err(invalid_request("expected a JSON object"));
        }

        serde_json::from_value(value).map_err(invalid_request)
    }

    /// Convert into a report, validating counts and embedded images
    pub fn into_report(self) -> Result<AnalysisReport, ApiError> {
        let defaults = AnalysisReport::default();

        let counts = self
            .counts
            .unwrap_or_default()
            .into_iter()
            .map(|(label, value)| {
                let count = count_value(&label, &value)?;
                Ok(ClassCount::new(label, count))
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        let total = match &self.total {
            Some(value) => count_value("total", value)?,
            None => defaults.total,
        };

        Ok(AnalysisReport {
            grade: self.grade.unwrap_or(defaults.grade),
            advice: self.advice.unwrap_or(defaults.advice),
            counts,
            total,
            detection_image: embedded_image(self.image_data)?,
            chart_image: embedded_image(self.chart_data)?,
        })
    }
}

fn invalid_request(e: impl std::fmt::Display) -> ApiError {
    ApiError::RenderError(format!("Invalid report request: {}", e))
}

/// Accept non-negative integers, including integral floats such as `3.0`
fn count_value(field: &str, value: &Value) -> Result<u64, ApiError> {
    let invalid = || ApiError::RenderError(format!("Invalid count for '{}': {}", field, value));

    match value {
        Value::Number(number) => {
            if let Some(count) = number.as_u64() {
                return Ok(count);
            }
            match number.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
                _ => Err(invalid()),
            }
        }
        _ => Err(invalid()),
    }
}

/// Empty strings count as absent
fn embedded_image(value: Option<String>) -> Result<Option<EncodedImage>, ApiError> {
    match value.filter(|s| !s.is_empty()) {
        Some(raw) => EncodedImage::parse(&raw)
            .map(Some)
            .map_err(|e| ApiError::RenderError(e.to_string())),
        None => Ok(None),
    }
}
