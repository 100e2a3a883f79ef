//! Shared models and types for the code scanner
//!
//! This module contains types shared across multiple modules
//! to avoid circular dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scan policy selected by the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// Report every successful decode, every tick
    Continuous,
    /// Track one code instance; report removal after debounced misses
    Single,
    /// Scan only on an explicit trigger() call
    Triggered,
}

impl Default for DetectionMode {
    fn default() -> Self {
        Self::Single
    }
}

/// Symbology family tag (e.g. "qrcode", "datamatrix")
///
/// Open set: decoder implementations choose their own tag.
/// Equality is exact string match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbology(String);

impl Symbology {
    /// Create a tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// QR code family
    pub fn qr_code() -> Self {
        Self::new("qrcode")
    }

    /// Data Matrix family
    pub fn data_matrix() -> Self {
        Self::new("datamatrix")
    }

    /// Tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbology {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Bounding rectangle in source-frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Polygon corner in source-frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePoint {
    pub x: i32,
    pub y: i32,
}

/// One decoded code, as delivered to the event sink
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeRecord {
    /// Symbology family tag
    #[serde(rename = "type")]
    pub symbology: Symbology,
    /// Decoded UTF-8 text
    pub data: String,
    /// Bounding rectangle
    pub rect: CodeRect,
    /// Polygon corners, empty when the decoder family provides none
    pub points: Vec<CodePoint>,
    /// Time of detection
    #[serde(rename = "timestamp")]
    pub detected_at: DateTime<Utc>,
}

impl CodeRecord {
    /// The (symbology, data) pair recognizing "the same code" across ticks
    pub fn identity(&self) -> CodeIdentity {
        CodeIdentity {
            symbology: self.symbology.clone(),
            data: self.data.clone(),
        }
    }
}

/// Identity of a tracked code instance
///
/// Exact-match equality only, no fuzzy matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeIdentity {
    pub symbology: Symbology,
    pub data: String,
}
