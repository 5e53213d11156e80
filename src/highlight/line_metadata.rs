//! Line lookup backed by the extraction result's per-line geometry.
//!
//! The OCR result carries one `line_metadata` entry per linearized text line,
//! normally `[page, base_y, height, page_height]` in page units. An object form
//! with the same fields is accepted too. Lines span the full page width.

use super::LineRectLookup;
use crate::model::{DocumentHandle, LineId, LineRect, LookupError, PageIndex, RenderSize};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Vertical extent of one line in page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGeometry {
    /// Page the line sits on.
    pub page: PageIndex,
    /// Top of the line in page units.
    pub base_y: f64,
    /// Line height in page units; zero means no box.
    pub height: f64,
    /// Page height in the same units as `base_y`.
    pub page_height: f64,
}

impl LineGeometry {
    /// Project into the pixel space of `target`.
    ///
    /// Returns `None` for zero-height lines and pages without a height.
    pub fn to_rect(&self, target: RenderSize) -> Option<LineRect> {
        if self.height == 0.0 || self.page_height == 0.0 {
            return None;
        }
        let scale = |y: f64| (y / self.page_height * target.height).floor();
        Some(LineRect {
            page: self.page,
            x1: 0.0,
            y1: scale(self.base_y),
            x2: target.width,
            y2: scale(self.base_y + self.height),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Line(LineGeometry),
    Malformed(String),
}

/// [`LineRectLookup`] over one document's `line_metadata`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineMetadataLookup {
    document: DocumentHandle,
    /// Keyed by line index. Object-form metadata may leave gaps.
    entries: BTreeMap<usize, Entry>,
}

impl LineMetadataLookup {
    /// Parse the `line_metadata` value of a result file.
    ///
    /// Accepts a list indexed by line, or an object keyed by the decimal line
    /// index. Bad entries are kept as malformed so their lines fail on lookup
    /// instead of shifting later lines.
    pub fn from_json(document: DocumentHandle, metadata: &Value) -> Self {
        let entries = match metadata {
            Value::Array(list) => list.iter().map(parse_entry).enumerate().collect(),
            Value::Object(map) => map
                .iter()
                .filter_map(|(key, value)| match key.parse::<usize>() {
                    Ok(index) => Some((index, parse_entry(value))),
                    Err(_) => {
                        debug!(key = %key, "Skipping non-numeric line_metadata key");
                        None
                    }
                })
                .collect(),
            other => {
                warn!(kind = %value_kind(other), "line_metadata is neither a list nor an object");
                BTreeMap::new()
            }
        };
        Self { document, entries }
    }

    /// Lookup over well-formed lines numbered from 0.
    pub fn from_lines(document: DocumentHandle, lines: Vec<LineGeometry>) -> Self {
        Self {
            document,
            entries: lines.into_iter().map(Entry::Line).enumerate().collect(),
        }
    }

    /// Number of line entries, malformed ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the metadata holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct pages referenced by well-formed lines, ascending.
    pub fn pages(&self) -> Vec<PageIndex> {
        let pages: BTreeSet<PageIndex> = self
            .entries
            .values()
            .filter_map(|entry| match entry {
                Entry::Line(geometry) => Some(geometry.page),
                Entry::Malformed(_) => None,
            })
            .collect();
        pages.into_iter().collect()
    }

    /// Synchronous form of [`LineRectLookup::lookup`] for this document.
    pub fn rect(&self, line: LineId, target: RenderSize) -> Result<LineRect, LookupError> {
        match self.entries.get(&line.get()) {
            None => Err(LookupError::InvalidLine {
                line,
                reason: format!("no entry for line (document has {} entries)", self.len()),
            }),
            Some(Entry::Malformed(reason)) => Err(LookupError::InvalidLine {
                line,
                reason: reason.clone(),
            }),
            Some(Entry::Line(geometry)) => geometry
                .to_rect(target)
                .ok_or(LookupError::NoBoundingBox { line }),
        }
    }
}

#[async_trait]
impl LineRectLookup for LineMetadataLookup {
    async fn lookup(
        &self,
        document: &DocumentHandle,
        line: LineId,
        target: RenderSize,
    ) -> Result<LineRect, LookupError> {
        if document != &self.document {
            return Err(LookupError::Unavailable(format!(
                "no line metadata loaded for document {document}"
            )));
        }
        self.rect(line, target)
    }
}

fn parse_entry(value: &Value) -> Entry {
    match value {
        Value::Array(fields) if fields.len() >= 4 => {
            let numbers: Option<Vec<f64>> = fields[..4].iter().map(Value::as_f64).collect();
            match numbers {
                Some(n) => geometry(n[0], n[1], n[2], n[3]),
                None => Entry::Malformed("non-numeric field in line entry".to_string()),
            }
        }
        Value::Array(fields) => {
            Entry::Malformed(format!("expected 4 fields, found {}", fields.len()))
        }
        Value::Object(map) => {
            let field = |names: &[&str]| names.iter().find_map(|n| map.get(*n)?.as_f64());
            match (
                field(&["page"]),
                field(&["base_y", "y", "top"]),
                field(&["height", "h"]),
                field(&["page_height"]),
            ) {
                (Some(page), Some(base_y), Some(height), Some(page_height)) => {
                    geometry(page, base_y, height, page_height)
                }
                _ => Entry::Malformed("line entry object missing geometry fields".to_string()),
            }
        }
        other => Entry::Malformed(format!("unexpected {} line entry", value_kind(other))),
    }
}

fn geometry(page: f64, base_y: f64, height: f64, page_height: f64) -> Entry {
    if !(page >= 0.0 && page.fract() == 0.0) {
        return Entry::Malformed(format!("invalid page number {page}"));
    }
    Entry::Line(LineGeometry {
        page: PageIndex::new(page as usize),
        base_y,
        height,
        page_height,
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
