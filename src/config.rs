//! Scanner configuration

use std::time::Duration;

/// CodeScanner configuration
///
/// All timing knobs of the capture loop live here so tests can shrink them.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Minimum gap between detection ticks
    pub detection_interval: Duration,
    /// Per-cycle sleep bounding CPU usage
    pub idle_sleep: Duration,
    /// Wait after a failed frame pull before the next attempt
    pub capture_backoff: Duration,
    /// Consecutive failed verifications before a removal event
    pub frames_to_consider_removed: u32,
    /// Wait after starting the frame source before the first capture
    pub source_warmup: Duration,
    /// Bound on waiting for the capture loop to finish in stop()
    pub shutdown_timeout: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            detection_interval: Duration::from_millis(50),
            idle_sleep: Duration::from_millis(1),
            capture_backoff: Duration::from_millis(500),
            frames_to_consider_removed: 3,
            source_warmup: Duration::from_secs(1),
            shutdown_timeout: Duration::from_secs(2),
        }
    }
}
