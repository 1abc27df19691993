// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PDF serialization of a laid-out [`Document`]

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use super::layout::{Document, DrawOp, FontStyle, PAGE_HEIGHT, PAGE_WIDTH};
use super::text::to_win_ansi;
use super::RenderError;

const POINTS_PER_MM: f32 = 72.0 / 25.4;
const PRODUCER: &str = concat!("Beras Vision Node ", env!("CARGO_PKG_VERSION"));

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");

/// Sequential object id allocator
struct RefAlloc(i32);

impl RefAlloc {
    fn next(&mut self) -> Ref {
        self.0 += 1;
        Ref::new(self.0)
    }
}

fn pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, RenderError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(RenderError::Write)?;
    encoder.finish().map_err(RenderError::Write)
}

fn font_name(style: FontStyle) -> Name<'static> {
    match style {
        FontStyle::Regular => REGULAR_FONT,
        FontStyle::Bold => BOLD_FONT,
    }
}

fn image_name(index: usize) -> String {
    format!("Im{}", index)
}

/// Serialize `document` to PDF bytes
///
/// Image samples are Flate-compressed; page content streams are written
/// uncompressed.
pub fn write_pdf(document: &Document) -> Result<Vec<u8>, RenderError> {
    let mut alloc = RefAlloc(0);
    let catalog_id = alloc.next();
    let page_tree_id = alloc.next();
    let info_id = alloc.next();
    let regular_id = alloc.next();
    let bold_id = alloc.next();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.document_info(info_id)
        .title(TextStr(&document.title))
        .producer(TextStr(PRODUCER));

    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let image_names: Vec<String> = (0..document.images.len()).map(image_name).collect();
    let mut image_ids = Vec::with_capacity(document.images.len());

    for raster in &document.images {
        let image_id = alloc.next();
        let mask_id = raster.alpha.as_ref().map(|_| alloc.next());

        let samples = deflate(&raster.rgb)?;
        let mut image = pdf.image_xobject(image_id, &samples);
        image.filter(Filter::FlateDecode);
        image.width(raster.width as i32);
        image.height(raster.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }
        image.finish();

        if let (Some(mask_id), Some(alpha)) = (mask_id, raster.alpha.as_ref()) {
            let alpha_samples = deflate(alpha)?;
            let mut mask = pdf.image_xobject(mask_id, &alpha_samples);
            mask.filter(Filter::FlateDecode);
            mask.width(raster.width as i32);
            mask.height(raster.height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            mask.finish();
        }

        image_ids.push(image_id);
    }

    let mut page_ids = Vec::with_capacity(document.pages.len());

    for page in &document.pages {
        let page_id = alloc.next();
        let content_id = alloc.next();
        page_ids.push(page_id);

        let mut content = Content::new();
        let mut used_images = Vec::new();

        for op in &page.ops {
            match op {
                DrawOp::Text { x, y, font, text } => {
                    content.begin_text();
                    content.set_font(font_name(font.style), font.size);
                    content.next_line(pt(*x), pt(PAGE_HEIGHT - y));
                    content.show(Str(&to_win_ansi(text)));
                    content.end_text();
                }
                DrawOp::Image {
                    index,
                    x,
                    y,
                    width,
                    height,
                } => {
                    content.save_state();
                    content.transform([
                        pt(*width),
                        0.0,
                        0.0,
                        pt(*height),
                        pt(*x),
                        pt(PAGE_HEIGHT - y - height),
                    ]);
                    content.x_object(Name(image_names[*index].as_bytes()));
                    content.restore_state();
                    used_images.push(*index);
                }
            }
        }

        pdf.stream(content_id, &content.finish());

        let mut page_writer = pdf.page(page_id);
        page_writer
            .media_box(Rect::new(0.0, 0.0, pt(PAGE_WIDTH), pt(PAGE_HEIGHT)))
            .parent(page_tree_id)
            .contents(content_id);

        let mut resources = page_writer.resources();
        resources
            .fonts()
            .pair(REGULAR_FONT, regular_id)
            .pair(BOLD_FONT, bold_id);
        if !used_images.is_empty() {
            let mut x_objects = resources.x_objects();
            for index in used_images {
                x_objects.pair(Name(image_names[index].as_bytes()), image_ids[index]);
            }
        }
        resources.finish();
        page_writer.finish();
    }

    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    Ok(pdf.finish())
}
