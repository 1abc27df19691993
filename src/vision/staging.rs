// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request-scoped temporary files for decoded assets
//!
//! A [`StagedAsset`] owns a uniquely named file that is deleted when the
//! value is dropped, so every exit path of the code holding it (success,
//! `?` early return, panic unwinding) removes the file.

use std::io::{self, Write};
use std::path::Path;

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// File name prefix for staged assets
pub const STAGING_PREFIX: &str = "beras-asset-";

/// A temporary file holding decoded asset bytes
#[derive(Debug)]
pub struct StagedAsset {
    file: NamedTempFile,
}

impl StagedAsset {
    /// Path of the staged file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now, reporting any error
    pub fn close(self) -> io::Result<()> {
        self.file.close()
    }
}

/// Write `bytes` to a new uniquely named file in `dir`
///
/// `suffix` is appended to the generated name (e.g. `.png`) for consumers
/// that infer the format from the extension.
pub fn materialize_to_temp(dir: &Path, bytes: &[u8], suffix: &str) -> io::Result<StagedAsset> {
    let mut file = Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(suffix)
        .tempfile_in(dir)?;

    file.write_all(bytes)?;
    file.flush()?;

    debug!("Staged {} bytes at {}", bytes.len(), file.path().display());

    Ok(StagedAsset { file })
}
