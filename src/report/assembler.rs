// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Report assembly: sections, staged images and serialization

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use image::ImageReader;
use tracing::{debug, info};

use super::layout::{Align, Document, FontStyle, Layout, RasterImage, MARGIN, PAGE_WIDTH};
use super::text::humanize_label;
use super::writer::write_pdf;
use super::{AnalysisReport, RenderError};
use crate::vision::{materialize_to_temp, EncodedImage, StagedAsset};

pub const REPORT_TITLE: &str = "Laporan Analisis Kualitas Beras";
pub const TIMESTAMP_FORMAT: &str = "%d %B %Y, %H:%M:%S";

const BODY_SIZE: f32 = 11.0;
const HEADING_SIZE: f32 = 12.0;
const TITLE_SIZE: f32 = 16.0;
const LINE_HEIGHT: f32 = 8.0;
const HEADING_HEIGHT: f32 = 10.0;

/// Builds PDF reports, staging embedded images under `staging_dir`
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    staging_dir: PathBuf,
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl ReportAssembler {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Build a report stamped with the current local time
    pub fn build(&self, report: &AnalysisReport) -> Result<Vec<u8>, RenderError> {
        self.build_at(report, Local::now().naive_local())
    }

    /// Build a report stamped with `generated_at`
    ///
    /// Staged image files live until the document has been serialized and
    /// are removed on every exit path.
    pub fn build_at(
        &self,
        report: &AnalysisReport,
        generated_at: NaiveDateTime,
    ) -> Result<Vec<u8>, RenderError> {
        let mut staged = Vec::new();

        let result = self
            .lay_out(report, generated_at, &mut staged)
            .and_then(|document| write_pdf(&document));

        debug!("Releasing {} staged report images", staged.len());
        drop(staged);

        let bytes = result?;
        info!("Generated report PDF ({} bytes)", bytes.len());
        Ok(bytes)
    }

    /// Lay out a report without serializing it
    pub fn document_at(
        &self,
        report: &AnalysisReport,
        generated_at: NaiveDateTime,
    ) -> Result<Document, RenderError> {
        let mut staged = Vec::new();
        self.lay_out(report, generated_at, &mut staged)
    }

    fn lay_out(
        &self,
        report: &AnalysisReport,
        generated_at: NaiveDateTime,
        staged: &mut Vec<StagedAsset>,
    ) -> Result<Document, RenderError> {
        let mut layout = Layout::new(REPORT_TITLE);

        layout.set_font(FontStyle::Bold, TITLE_SIZE);
        layout.cell(HEADING_HEIGHT, REPORT_TITLE, Align::Center);
        layout.ln(5.0);

        layout.set_font(FontStyle::Regular, 10.0);
        let stamp = format!(
            "Tanggal Analisis: {}",
            generated_at.format(TIMESTAMP_FORMAT)
        );
        layout.cell(HEADING_HEIGHT, &stamp, Align::Center);
        layout.ln(10.0);

        if let Some(chart) = &report.chart_image {
            let raster = self.load_image(chart, staged)?;
            heading(&mut layout, "Distribusi Kualitas");
            layout.image(raster, PAGE_WIDTH / 4.0, PAGE_WIDTH / 2.0);
            layout.ln(10.0);
        }

        heading(&mut layout, "Ringkasan Deteksi");
        layout.set_font(FontStyle::Regular, BODY_SIZE);
        layout.cell(
            LINE_HEIGHT,
            &format!("- Total Objek Terdeteksi: {}", report.total),
            Align::Left,
        );
        for class_count in &report.counts {
            let line = format!(
                "- {}: {} buah",
                humanize_label(&class_count.label),
                class_count.count
            );
            layout.cell(LINE_HEIGHT, &line, Align::Left);
        }
        layout.ln(5.0);

        heading(&mut layout, "Grade Kualitas");
        layout.set_font(FontStyle::Regular, BODY_SIZE);
        layout.multi_cell(LINE_HEIGHT, &report.grade);
        layout.ln(5.0);

        heading(&mut layout, "Saran");
        layout.set_font(FontStyle::Regular, BODY_SIZE);
        layout.multi_cell(LINE_HEIGHT, &report.advice);
        layout.ln(10.0);

        if let Some(detection) = &report.detection_image {
            let raster = self.load_image(detection, staged)?;
            heading(&mut layout, "Gambar Hasil Deteksi");
            layout.image(raster, MARGIN, PAGE_WIDTH - 2.0 * MARGIN);
        }

        Ok(layout.finish())
    }

    /// Decode an embedded image, stage it on disk and read it back
    fn load_image(
        &self,
        encoded: &EncodedImage,
        staged: &mut Vec<StagedAsset>,
    ) -> Result<RasterImage, RenderError> {
        let bytes = encoded.decode()?;
        let asset = materialize_to_temp(&self.staging_dir, &bytes, encoded.file_suffix())
            .map_err(RenderError::Staging)?;

        let path = asset.path().to_path_buf();
        staged.push(asset);

        let image = ImageReader::open(&path)
            .map_err(|e| RenderError::Image(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| RenderError::Image(e.to_string()))?
            .decode()
            .map_err(|e| RenderError::Image(e.to_string()))?;

        debug!(
            "Loaded staged image {}x{} from {}",
            image.width(),
            image.height(),
            path.display()
        );

        Ok(RasterImage::from_dynamic(&image))
    }
}

fn heading(layout: &mut Layout, text: &str) {
    layout.set_font(FontStyle::Bold, HEADING_SIZE);
    layout.cell(HEADING_HEIGHT, text, Align::Left);
}
