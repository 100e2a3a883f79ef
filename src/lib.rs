//! codewatch - Code Presence Scanner Library
//!
//! Detects machine-readable codes (QR, Data Matrix, ...) in a live video
//! stream and reports discrete appearance/removal events under three
//! policies: continuous, single-tracked with debounced removal, and
//! manually triggered one-shot scanning.
//!
//! ## Architecture (7 Components)
//!
//! 1. FrameSource - Frame acquisition seam (external implementations)
//! 2. Decoder / DecoderSet - Symbology capability seam (external implementations)
//! 3. FrameBuffer - Single-slot latest-frame cache
//! 4. Scanner - Priority-ordered decode pass and re-verification
//! 5. DetectionStateMachine - Mode policy and debounced presence tracking
//! 6. CodeScanner - Capture loop and thread-safe control surface
//! 7. EventSink - Synchronous event delivery to the consumer
//!
//! ## Design Principles
//!
//! - One exclusion guard: ticks, triggers and mode switches never interleave
//! - Runtime failures are absorbed and logged; only construction fails loud
//! - Decoding stays behind the Decoder seam; this crate only coordinates

pub mod code_scanner;
pub mod config;
pub mod decoder;
pub mod error;
pub mod events;
pub mod frame_buffer;
pub mod models;
pub mod source;

mod detection;
mod scanner;

pub use code_scanner::CodeScanner;
pub use config::ScannerConfig;
pub use decoder::{DecodeError, DecodeResult, DecodedSymbol, Decoder, DecoderSet};
pub use error::{Error, Result};
pub use events::{EventSink, SinkError};
pub use frame_buffer::FrameBuffer;
pub use models::{CodeIdentity, CodePoint, CodeRecord, CodeRect, DetectionMode, Symbology};
pub use source::{CaptureError, Frame, FrameSource};
