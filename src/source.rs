//! Frame acquisition seam
//!
//! The scanner does no camera handling itself. A `FrameSource`
//! implementation supplies raw images; the capture loop converts them to
//! the canonical grayscale frames decoders consume.

use chrono::{DateTime, Utc};
use image::{GrayImage, RgbImage};

/// Errors that can occur while acquiring frames.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The source could not be opened or started
    #[error("Failed to open source: {0}")]
    OpenFailed(String),

    /// A single frame pull failed
    #[error("Failed to capture frame: {0}")]
    CaptureFailed(String),

    /// The source was used before start()
    #[error("Source is not started")]
    NotStarted,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One canonical frame as seen by decoders.
///
/// Ephemeral: overwritten each capture cycle, never persisted.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Grayscale pixel data
    pub image: GrayImage,
    /// Capture timestamp
    pub captured_at: DateTime<Utc>,
    /// Frame number within the current run
    pub sequence: u64,
}

impl Frame {
    /// Wrap a raw image, converting to the canonical grayscale form
    pub fn from_rgb(image: &RgbImage, sequence: u64) -> Self {
        Self {
            image: image::imageops::grayscale(image),
            captured_at: Utc::now(),
            sequence,
        }
    }

    /// Build directly from grayscale data (pre-converted sources)
    pub fn from_luma(image: GrayImage, sequence: u64) -> Self {
        Self {
            image,
            captured_at: Utc::now(),
            sequence,
        }
    }

    /// Image dimensions (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Trait for sources that provide video frames.
///
/// Implementations are called from the capture task and may block briefly;
/// a slow source directly delays detection ticks. Sources must tolerate a
/// stop()/start() cycle so the scanner can be restarted.
pub trait FrameSource: Send {
    /// Start the source (open the device, begin streaming)
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Pull the next frame
    ///
    /// Errors are transient: the capture loop logs them, backs off and
    /// retries. Only a stop signal ends the loop.
    fn next_frame(&mut self) -> Result<RgbImage, CaptureError>;

    /// Stop the source and release the device
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb_converts_to_grayscale() {
        let rgb = RgbImage::from_pixel(8, 6, image::Rgb([200, 100, 50]));
        let frame = Frame::from_rgb(&rgb, 1);
        assert_eq!(frame.dimensions(), (8, 6));
        assert_eq!(frame.sequence, 1);
    }

    #[test]
    fn test_from_luma_keeps_pixels() {
        let gray = GrayImage::from_pixel(4, 4, image::Luma([128]));
        let frame = Frame::from_luma(gray, 7);
        assert_eq!(frame.image.get_pixel(0, 0).0, [128]);
        assert_eq!(frame.sequence, 7);
    }
}
