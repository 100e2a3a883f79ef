//! Decoder capability seam
//!
//! ## Responsibilities
//!
//! - Define the uniform interface every symbology family adapts to
//! - Resolve the supplied decoders into an explicit capability set
//! - Preserve family priority (registration order)

use crate::error::{Error, Result};
use crate::models::{CodePoint, CodeRect, Symbology};
use image::GrayImage;
use std::collections::HashSet;

/// Errors surfaced by a decoder invocation.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The underlying library rejected the frame or failed internally
    #[error("Decode failed: {0}")]
    Failed(String),

    /// The decoder gave up after its configured time limit
    #[error("Decode timed out after {0:?}")]
    TimedOut(std::time::Duration),
}

/// Result of one decoder invocation
pub type DecodeResult = std::result::Result<Vec<DecodedSymbol>, DecodeError>;

/// One decoded symbol, before it becomes a [`CodeRecord`](crate::CodeRecord)
#[derive(Debug, Clone)]
pub struct DecodedSymbol {
    /// Decoded UTF-8 text
    pub data: String,
    /// Bounding rectangle in source pixel coordinates
    pub rect: CodeRect,
    /// Polygon corners, empty when the family provides none
    pub points: Vec<CodePoint>,
}

/// Trait for symbology-family decoders.
///
/// One instance per family. Implementations translate their native failures
/// into `DecodeError` or an empty result, and bound their own execution
/// time: the capture loop never cancels an in-flight decode, so an unbounded
/// decoder stalls every subsequent cycle.
pub trait Decoder: Send {
    /// Family tag this decoder handles
    fn symbology(&self) -> Symbology;

    /// Decode all symbols of this family visible in the frame
    fn decode(&self, image: &GrayImage) -> DecodeResult;
}

/// Priority-ordered decoder capability set
///
/// Resolved once at construction; priority is the order decoders were
/// supplied in.
pub struct DecoderSet {
    decoders: Vec<Box<dyn Decoder>>,
}

impl std::fmt::Debug for DecoderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderSet")
            .field("len", &self.decoders.len())
            .finish_non_exhaustive()
    }
}

impl DecoderSet {
    /// Resolve decoders into a capability set
    ///
    /// Fails when the set is empty or two decoders claim the same family.
    pub fn new(decoders: Vec<Box<dyn Decoder>>) -> Result<Self> {
        if decoders.is_empty() {
            return Err(Error::Config("no decoders available".to_string()));
        }

        let mut seen = HashSet::new();
        for decoder in &decoders {
            let family = decoder.symbology();
            if !seen.insert(family.clone()) {
                return Err(Error::Config(format!(
                    "duplicate decoder for symbology {family}"
                )));
            }
        }

        for decoder in &decoders {
            tracing::info!(symbology = %decoder.symbology(), "Decoder enabled");
        }

        Ok(Self { decoders })
    }

    /// Decoders in priority order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Decoder> {
        self.decoders.iter().map(|d| d.as_ref())
    }

    /// Find the decoder for a family, if present
    pub fn get(&self, symbology: &Symbology) -> Option<&dyn Decoder> {
        self.decoders
            .iter()
            .find(|d| d.symbology() == *symbology)
            .map(|d| d.as_ref())
    }

    /// Capability-presence check
    pub fn supports(&self, symbology: &Symbology) -> bool {
        self.get(symbology).is_some()
    }

    /// Number of enabled families
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// True when no families are enabled (unreachable past construction)
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}
