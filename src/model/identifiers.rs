//! Core identifier newtypes with smart constructors.
//!
//! Raw constructors are never exported - use smart constructors only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle naming one processed source document.
///
/// The extraction source and the line→rect lookup are both keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentHandle(String);

impl DocumentHandle {
    /// Smart constructor: validates a non-blank handle.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidDocumentHandle> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            Err(InvalidDocumentHandle::Empty)
        } else {
            Ok(Self(raw))
        }
    }

    /// Borrow the raw handle.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DocumentHandle {
    type Error = InvalidDocumentHandle;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentHandle> for String {
    fn from(handle: DocumentHandle) -> Self {
        handle.0
    }
}

/// Zero-based index into the document's linearized text.
///
/// The only positional anchor shared between extracted fields and rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineId(usize);

impl LineId {
    /// Wrap a zero-based line index.
    pub fn new(line: usize) -> Self {
        Self(line)
    }

    /// Accept a raw, possibly negative id as it arrives from a UI or JSON payload.
    ///
    /// Returns `None` for negative values.
    pub fn from_raw(raw: i64) -> Option<Self> {
        usize::try_from(raw).ok().map(Self)
    }

    /// Zero-based line index.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-based page index within a rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PageIndex(usize);

impl PageIndex {
    /// Wrap a zero-based page index.
    pub fn new(page: usize) -> Self {
        Self(page)
    }

    /// Zero-based page index.
    pub fn get(&self) -> usize {
        self.0
    }

    /// 1-based page number for display.
    pub fn display(&self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ===== Error Types =====

/// Rejection reasons for [`DocumentHandle::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDocumentHandle {
    /// Handle was empty or whitespace.
    #[error("Document handle cannot be empty")]
    Empty,
}

// ===== Tests =====
