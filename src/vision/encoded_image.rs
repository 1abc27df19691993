// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embedded images transmitted as `<media-type-marker>,<base64-payload>`
//!
//! Browsers produce these with `canvas.toDataURL()`, e.g.
//! `data:image/png;base64,iVBORw0KGgo...`.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::image_utils::{extension_for_media_type, ImageError};

/// An image embedded in a text value, decoded on demand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    marker: String,
    payload: String,
}

impl EncodedImage {
    /// Split an embedded image at its first `,`
    ///
    /// Only the separator is checked here; the payload is validated by
    /// [`EncodedImage::decode`].
    pub fn parse(value: &str) -> Result<Self, ImageError> {
        let (marker, payload) = value.split_once(',').ok_or_else(|| {
            ImageError::MalformedEncoding("missing ',' between media type and payload".to_string())
        })?;

        Ok(Self {
            marker: marker.to_string(),
            payload: payload.to_string(),
        })
    }

    /// Build an embedded image from raw bytes
    pub fn encode(media_type: &str, bytes: &[u8]) -> Self {
        Self {
            marker: format!("data:{};base64", media_type),
            payload: STANDARD.encode(bytes),
        }
    }

    /// Decode the payload into raw bytes
    ///
    /// ASCII whitespace inside the payload (line-wrapped base64) is ignored.
    pub fn decode(&self) -> Result<Vec<u8>, ImageError> {
        let compact: String = self
            .payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        if compact.is_empty() {
            return Err(ImageError::EmptyData);
        }

        STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ImageError::MalformedEncoding(format!("invalid base64 payload: {}", e)))
    }

    /// The media-type marker, e.g. `data:image/png;base64`
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// The base64 section after the separator
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Media type declared by the marker (`image/png` for `data:image/png;base64`)
    pub fn media_type(&self) -> &str {
        let marker = self.marker.trim();
        let marker = marker.strip_prefix("data:").unwrap_or(marker);
        marker.split(';').next().unwrap_or_default().trim()
    }

    /// File suffix matching the declared media type
    pub fn file_suffix(&self) -> &'static str {
        extension_for_media_type(self.media_type())
    }
}

impl FromStr for EncodedImage {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.marker, self.payload)
    }
}
