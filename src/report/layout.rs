// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Flow layout for single-column A4 reports
//!
//! Positions are millimetres from the top-left corner of the page. Content
//! flows down from the top margin and moves to a new page when a cell or
//! image would cross the bottom break line.

use image::DynamicImage;

use super::text::{string_width, wrap_lines};

/// A4 portrait
pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
/// Left, top and right margin
pub const MARGIN: f32 = 10.0;
/// Distance from the bottom edge at which content breaks to a new page
pub const BREAK_MARGIN: f32 = 20.0;
/// Horizontal padding inside a cell
pub const CELL_MARGIN: f32 = 1.0;

const MM_PER_POINT: f32 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// Font face and size in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub style: FontStyle,
    pub size: f32,
}

impl Font {
    pub fn size_mm(&self) -> f32 {
        self.size * MM_PER_POINT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Decoded raster ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// 8-bit RGB samples, row-major
    pub rgb: Vec<u8>,
    /// 8-bit alpha samples when the source had an alpha channel
    pub alpha: Option<Vec<u8>>,
}

impl RasterImage {
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let alpha = if image.color().has_alpha() {
            Some(image.to_rgba8().pixels().map(|p| p.0[3]).collect())
        } else {
            None
        };

        Self {
            width: image.width(),
            height: image.height(),
            rgb: image.to_rgb8().into_raw(),
            alpha,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        /// Baseline position
        y: f32,
        font: Font,
        text: String,
    },
    Image {
        /// Index into [`Document::images`]
        index: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// Laid-out report ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
    pub images: Vec<RasterImage>,
}

impl Document {
    /// All text runs in reading order
    pub fn text_lines(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|page| page.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Image { .. } => None,
            })
            .collect()
    }
}

/// Cursor-based page builder
#[derive(Debug)]
pub struct Layout {
    document: Document,
    y: f32,
    font: Font,
}

impl Layout {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            document: Document {
                title: title.into(),
                pages: vec![Page::default()],
                images: Vec::new(),
            },
            y: MARGIN,
            font: Font {
                style: FontStyle::Regular,
                size: 12.0,
            },
        }
    }

    pub fn set_font(&mut self, style: FontStyle, size: f32) {
        self.font = Font { style, size };
    }

    /// Current vertical cursor
    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.document.pages.len()
    }

    /// Width between the left and right margins
    pub fn content_width(&self) -> f32 {
        PAGE_WIDTH - 2.0 * MARGIN
    }

    fn break_line(&self) -> f32 {
        PAGE_HEIGHT - BREAK_MARGIN
    }

    fn add_page(&mut self) {
        self.document.pages.push(Page::default());
        self.y = MARGIN;
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y + height > self.break_line() && self.y > MARGIN {
            self.add_page();
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.document.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Full-width single line cell; the cursor moves below it
    pub fn cell(&mut self, height: f32, text: &str, align: Align) {
        self.ensure_room(height);

        if !text.is_empty() {
            let width = self.content_width();
            let dx = match align {
                Align::Left => CELL_MARGIN,
                Align::Center => (width - string_width(text, self.font)) / 2.0,
            };

            self.push(DrawOp::Text {
                x: MARGIN + dx,
                y: self.y + 0.5 * height + 0.3 * self.font.size_mm(),
                font: self.font,
                text: text.to_string(),
            });
        }

        self.y += height;
    }

    /// Left-aligned paragraph wrapped to the content width
    pub fn multi_cell(&mut self, line_height: f32, text: &str) {
        let max_width = self.content_width() - 2.0 * CELL_MARGIN;
        for line in wrap_lines(text, self.font, max_width) {
            self.cell(line_height, &line, Align::Left);
        }
    }

    /// Vertical gap
    pub fn ln(&mut self, height: f32) {
        self.y += height;
    }

    /// Place an image at `x` scaled to `width`, keeping its aspect ratio
    pub fn image(&mut self, image: RasterImage, x: f32, width: f32) {
        let height = if image.width == 0 {
            0.0
        } else {
            width * image.height as f32 / image.width as f32
        };

        self.ensure_room(height);

        let index = self.document.images.len();
        self.document.images.push(image);
        self.push(DrawOp::Image {
            index,
            x,
            y: self.y,
            width,
            height,
        });

        self.y += height;
    }

    pub fn finish(self) -> Document {
        self.document
    }
}
