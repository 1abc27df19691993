// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text helpers for report rendering: label humanizing, WinAnsi encoding,
//! Helvetica metrics and line wrapping

use super::layout::{Font, FontStyle};

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths (1/1000 em) for ASCII 32..=126
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width used for Latin-1 characters outside the ASCII table
const DEFAULT_WIDTH: u16 = 556;

/// Turn a class label into display text: `broken-rice` → `Broken Rice`
pub fn humanize_label(label: &str) -> String {
    title_case(&label.replace('-', " "))
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
///
/// Any non-alphabetic character starts a new run, so `2nd` becomes `2Nd`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

/// Map a character to its WinAnsi byte, `?` when it has none
///
/// Latin-1 code points outside the C1 control range map to themselves.
pub fn win_ansi_byte(c: char) -> u8 {
    match c as u32 {
        code @ 0x20..=0x7E => code as u8,
        code @ 0xA0..=0xFF => code as u8,
        _ => b'?',
    }
}

/// Encode text for a Type1 font with WinAnsiEncoding
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn char_width(byte: u8, style: FontStyle) -> u16 {
    let table = match style {
        FontStyle::Regular => &HELVETICA_WIDTHS,
        FontStyle::Bold => &HELVETICA_BOLD_WIDTHS,
    };

    match byte {
        0x20..=0x7E => table[(byte - 0x20) as usize],
        _ => DEFAULT_WIDTH,
    }
}

/// Rendered width of `text` in millimetres
pub fn string_width(text: &str, font: Font) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| char_width(win_ansi_byte(c), font.style) as u32)
        .sum();
    units as f32 * font.size_mm() / 1000.0
}

/// Break `text` into lines no wider than `max_width` millimetres
///
/// Lines break at the last space that fits (the space is dropped) or, for a
/// single word wider than the line, between characters. Explicit newlines
/// always break. Always returns at least one line.
pub fn wrap_lines(text: &str, font: Font, max_width: f32) -> Vec<String> {
    let chars: Vec<char> = text.chars().filter(|c| *c != '\r').collect();
    let mut lines = Vec::new();

    let mut start = 0;
    let mut i = 0;
    let mut last_space: Option<usize> = None;
    let mut width = 0.0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            lines.push(chars[start..i].iter().collect());
            i += 1;
            start = i;
            last_space = None;
            width = 0.0;
            continue;
        }

        if c == ' ' {
            last_space = Some(i);
        }

        width += char_width(win_ansi_byte(c), font.style) as f32 * font.size_mm() / 1000.0;

        if width > max_width {
            match last_space {
                Some(space) if space > start => {
                    lines.push(chars[start..space].iter().collect());
                    i = space + 1;
                }
                _ => {
                    if i == start {
                        i += 1;
                    }
                    lines.push(chars[start..i].iter().collect());
                }
            }
            start = i;
            last_space = None;
            width = 0.0;
        } else {
            i += 1;
        }
    }

    lines.push(chars[start..].iter().collect());
    lines
}
