//! Scanner - Priority-Ordered Decode Pass
//!
//! ## Responsibilities
//!
//! - Run decoders in priority order, short-circuiting on first success
//! - Re-verify a tracked identity against its own family only
//! - Isolate decoder failures (logged, treated as "no result")

use crate::decoder::DecoderSet;
use crate::models::{CodeIdentity, CodeRecord};
use crate::source::Frame;
use chrono::Utc;

/// Runs the decoder capability set against frames
pub(crate) struct Scanner {
    decoders: DecoderSet,
}

impl Scanner {
    pub(crate) fn new(decoders: DecoderSet) -> Self {
        Self { decoders }
    }

    /// Full scan: the first family yielding a symbol wins
    ///
    /// No aggregation across families within one tick; the winning family's
    /// first symbol becomes the record.
    pub(crate) fn scan(&self, frame: &Frame) -> Option<CodeRecord> {
        for decoder in self.decoders.iter() {
            match decoder.decode(&frame.image) {
                Ok(symbols) => {
                    if let Some(symbol) = symbols.into_iter().next() {
                        let record = CodeRecord {
                            symbology: decoder.symbology(),
                            data: symbol.data,
                            rect: symbol.rect,
                            points: symbol.points,
                            detected_at: Utc::now(),
                        };
                        tracing::debug!(
                            symbology = %record.symbology,
                            data = %record.data,
                            sequence = frame.sequence,
                            "Scan hit"
                        );
                        return Some(record);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        symbology = %decoder.symbology(),
                        error = %e,
                        "Decoder failed; trying next family"
                    );
                }
            }
        }
        None
    }

    /// Removal check: does the tracked identity still decode?
    ///
    /// Only the identity's own family is consulted; any failure counts as a
    /// miss for this tick.
    pub(crate) fn verify(&self, frame: &Frame, identity: &CodeIdentity) -> bool {
        let Some(decoder) = self.decoders.get(&identity.symbology) else {
            tracing::warn!(
                symbology = %identity.symbology,
                "No decoder for tracked symbology"
            );
            return false;
        };

        match decoder.decode(&frame.image) {
            Ok(symbols) => symbols.iter().any(|s| s.data == identity.data),
            Err(e) => {
                tracing::debug!(
                    symbology = %identity.symbology,
                    error = %e,
                    "Verification decode failed"
                );
                false
            }
        }
    }
}
