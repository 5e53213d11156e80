//! File-based extraction source.
//!
//! Each run is a JSON file holding either a bare array of items or an object with
//! the array under `items` or `fields`. Items are parsed at the boundary: values
//! are coerced to text and unusable line numbers are dropped, so nothing
//! downstream ever sees a negative or fractional line.

use super::ExtractionSource;
use crate::highlight::LineMetadataLookup;
use crate::model::error::SourceError;
use crate::model::{DocumentHandle, ExtractionItem, Side};
use crate::state::ApprovalMap;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Both runs of one document read from local files.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSource {
    run_a: PathBuf,
    run_b: PathBuf,
}

impl FileSource {
    /// Source reading run A and run B from the given files.
    pub fn new(run_a: impl Into<PathBuf>, run_b: impl Into<PathBuf>) -> Self {
        Self {
            run_a: run_a.into(),
            run_b: run_b.into(),
        }
    }

    /// File holding `run`.
    pub fn path(&self, run: Side) -> &Path {
        match run {
            Side::A => &self.run_a,
            Side::B => &self.run_b,
        }
    }
}

#[async_trait]
impl ExtractionSource for FileSource {
    async fn fetch(
        &self,
        document: &DocumentHandle,
        run: Side,
    ) -> Result<Vec<ExtractionItem>, SourceError> {
        debug!(%document, %run, path = %self.path(run).display(), "Reading extraction run");
        load_items(self.path(run))
    }
}

/// Item as found on disk, before coercion.
#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default, alias = "key")]
    source_key: Option<String>,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    line_numbers: Vec<Value>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Read one run's items from `path`.
///
/// # Errors
///
/// Returns `SourceError::FileNotFound` if the file does not exist.
/// Returns `SourceError::Io` for other read failures.
/// Returns `SourceError::Malformed` if the JSON has no item array.
pub fn load_items(path: &Path) -> Result<Vec<ExtractionItem>, SourceError> {
    let document = read_json(path)?;
    let list = match document {
        Value::Array(list) => list,
        Value::Object(mut map) => match map.remove("items").or_else(|| map.remove("fields")) {
            Some(Value::Array(list)) => list,
            _ => {
                return Err(SourceError::Malformed {
                    path: path.to_path_buf(),
                    reason: "expected an `items` or `fields` array".to_string(),
                })
            }
        },
        _ => {
            return Err(SourceError::Malformed {
                path: path.to_path_buf(),
                reason: "expected an array of items".to_string(),
            })
        }
    };

    list.into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let raw: RawItem =
                serde_json::from_value(raw).map_err(|e| SourceError::Malformed {
                    path: path.to_path_buf(),
                    reason: format!("item {index}: {e}"),
                })?;
            Ok(coerce(raw, index))
        })
        .collect()
}

/// Read the `line_metadata` of an extraction result file.
///
/// # Errors
///
/// Same as [`load_items`]; `Malformed` if the result has no `line_metadata`.
pub fn load_line_metadata(
    path: &Path,
    document: DocumentHandle,
) -> Result<LineMetadataLookup, SourceError> {
    let result = read_json(path)?;
    let metadata = result.get("line_metadata").ok_or_else(|| SourceError::Malformed {
        path: path.to_path_buf(),
        reason: "result has no `line_metadata`".to_string(),
    })?;
    let lookup = LineMetadataLookup::from_json(document, metadata);
    debug!(lines = lookup.len(), path = %path.display(), "Loaded line metadata");
    Ok(lookup)
}

/// Read approvals saved as a JSON object of row label to accepted value.
///
/// # Errors
///
/// Same as [`load_items`]; `Malformed` if the object holds non-string values.
pub fn load_approvals(path: &Path) -> Result<ApprovalMap, SourceError> {
    let value = read_json(path)?;
    serde_json::from_value(value).map_err(|e| SourceError::Malformed {
        path: path.to_path_buf(),
        reason: format!("approvals: {e}"),
    })
}

fn read_json(path: &Path) -> Result<Value, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SourceError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            SourceError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_str(&text).map_err(|e| SourceError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn coerce(raw: RawItem, index: usize) -> ExtractionItem {
    let value = match raw.value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    };
    let total = raw.line_numbers.len();
    let line_numbers: Vec<usize> = raw
        .line_numbers
        .iter()
        .filter_map(|n| n.as_u64().and_then(|n| usize::try_from(n).ok()))
        .collect();
    if line_numbers.len() < total {
        warn!(
            item = index,
            dropped = total - line_numbers.len(),
            "Dropping unusable line numbers"
        );
    }
    ExtractionItem {
        source_key: raw.source_key.unwrap_or_default(),
        value,
        line_numbers,
        confidence: raw.confidence,
    }
}
