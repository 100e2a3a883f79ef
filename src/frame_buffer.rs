//! FrameBuffer - Latest-Frame Cache
//!
//! ## Responsibilities
//!
//! - Hold the most recent captured frame (single slot)
//! - Copy-on-read access so readers never observe a partial write
//! - Cleared on stop; nothing is persisted

use crate::source::Frame;
use tokio::sync::RwLock;

/// Single-slot holder of the most recent frame
///
/// Single writer (the capture loop), many readers.
pub struct FrameBuffer {
    slot: RwLock<Option<Frame>>,
}

impl FrameBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Store a frame, replacing any previous content
    pub async fn store(&self, frame: Frame) {
        let sequence = frame.sequence;
        *self.slot.write().await = Some(frame);
        tracing::trace!(sequence, "Stored frame");
    }

    /// Copy of the latest frame, or None if nothing captured yet
    pub async fn latest(&self) -> Option<Frame> {
        self.slot.read().await.clone()
    }

    /// Whether a frame has been captured yet
    pub async fn has_frame(&self) -> bool {
        self.slot.read().await.is_some()
    }

    /// Drop the buffered frame
    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
