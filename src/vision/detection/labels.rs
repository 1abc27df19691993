// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class label table for detection models
//!
//! Exported YOLO models carry their class names as a `names` metadata entry
//! holding a dictionary literal such as `{0: 'broken-rice', 1: 'whole-rice'}`.

use std::collections::BTreeMap;

/// Index-ordered class names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassLabels {
    names: Vec<String>,
}

impl ClassLabels {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Parse a `names` metadata dictionary
    ///
    /// Accepts single or double quoted values. Gaps in the index range are
    /// filled with generated names. Returns `None` when nothing parses.
    pub fn from_metadata(raw: &str) -> Option<Self> {
        let entries = parse_names_dict(raw)?;
        let max_index = *entries.keys().next_back()?;

        let names = (0..=max_index)
            .map(|id| {
                entries
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| fallback_name(id))
            })
            .collect();

        Some(Self { names })
    }

    /// Label for a class index
    pub fn name(&self, class_id: usize) -> String {
        self.names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| fallback_name(class_id))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn fallback_name(class_id: usize) -> String {
    format!("class_{}", class_id)
}

fn parse_names_dict(raw: &str) -> Option<BTreeMap<usize, String>> {
    let body = raw.trim().strip_prefix('{')?.strip_suffix('}')?;
    let mut chars = body.chars().peekable();
    let mut entries = BTreeMap::new();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        // Key: integer, optionally quoted in JSON-style metadata
        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == ':' {
                break;
            }
            key.push(c);
            chars.next();
        }
        let key: usize = key
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .parse()
            .ok()?;

        if chars.next() != Some(':') {
            return None;
        }
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }

        let quote = chars.next().filter(|c| *c == '\'' || *c == '"')?;
        let mut value = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => value.push(chars.next()?),
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => value.push(c),
            }
        }
        if !closed {
            return None;
        }

        entries.insert(key, value);
    }

    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}
