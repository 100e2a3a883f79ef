//! Detection state machine
//!
//! Owns the scanning-policy state and decides, per tick, what work runs.
//! In SINGLE mode only transitions emit events, so a code sitting in front
//! of the camera does not spam the sink. CONTINUOUS reports every hit and
//! TRIGGERED scans only on demand.

use crate::events::EventSink;
use crate::models::{CodeIdentity, CodeRecord, DetectionMode};
use crate::scanner::Scanner;
use crate::source::Frame;
use std::sync::Arc;

/// Mutable scanning-policy state
///
/// Exclusively owned by the state machine; every mutation happens under the
/// scanner-wide exclusion guard.
#[derive(Debug, Clone)]
struct ScannerState {
    mode: DetectionMode,
    tracked: Option<CodeIdentity>,
    consecutive_misses: u32,
    trigger_busy: bool,
}

impl ScannerState {
    fn new() -> Self {
        Self {
            mode: DetectionMode::default(),
            tracked: None,
            consecutive_misses: 0,
            trigger_busy: false,
        }
    }
}

/// Per-tick scan policy and presence tracking
pub(crate) struct DetectionStateMachine {
    scanner: Scanner,
    state: ScannerState,
    sink: Option<Arc<dyn EventSink>>,
    frames_to_consider_removed: u32,
}

impl DetectionStateMachine {
    pub(crate) fn new(scanner: Scanner, frames_to_consider_removed: u32) -> Self {
        Self {
            scanner,
            state: ScannerState::new(),
            sink: None,
            frames_to_consider_removed,
        }
    }

    /// Bind the sink for a run
    pub(crate) fn bind_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.sink = Some(sink);
    }

    /// Unbind the sink; no events can be delivered afterwards
    pub(crate) fn release_sink(&mut self) {
        self.sink = None;
    }

    pub(crate) fn mode(&self) -> DetectionMode {
        self.state.mode
    }

    pub(crate) fn tracked(&self) -> Option<CodeIdentity> {
        self.state.tracked.clone()
    }

    /// Swap mode and reset tracking, regardless of prior state
    pub(crate) fn set_mode(&mut self, mode: DetectionMode) {
        let prev = self.state.mode;
        self.state.mode = mode;
        self.reset_tracking();
        tracing::info!(from = ?prev, to = ?mode, "Detection mode changed");
    }

    /// Clear identity, miss counter and busy flag; mode stays
    pub(crate) fn reset_tracking(&mut self) {
        self.state.tracked = None;
        self.state.consecutive_misses = 0;
        self.state.trigger_busy = false;
    }

    /// One eligible detection tick
    pub(crate) fn on_tick(&mut self, frame: &Frame) {
        match self.state.mode {
            DetectionMode::Continuous => {
                if let Some(record) = self.scanner.scan(frame) {
                    self.emit_appearance(record);
                }
            }
            DetectionMode::Single => match self.state.tracked.clone() {
                Some(identity) => self.check_removal(frame, &identity),
                None => {
                    if let Some(record) = self.scanner.scan(frame) {
                        self.state.tracked = Some(record.identity());
                        self.state.consecutive_misses = 0;
                        self.emit_appearance(record);
                    }
                }
            },
            // Periodic ticks never scan here; only trigger() does.
            DetectionMode::Triggered => {}
        }
    }

    /// One manual scan of the supplied frame (TRIGGERED mode only)
    pub(crate) fn on_trigger(&mut self, frame: &Frame) {
        if self.state.mode != DetectionMode::Triggered {
            tracing::warn!(mode = ?self.state.mode, "Trigger ignored outside triggered mode");
            return;
        }
        if self.state.trigger_busy {
            tracing::warn!("Trigger already in progress");
            return;
        }

        self.state.trigger_busy = true;
        match self.scanner.scan(frame) {
            Some(record) => self.emit_appearance(record),
            None => tracing::debug!(sequence = frame.sequence, "Trigger scan found nothing"),
        }
        self.state.trigger_busy = false;
    }

    /// Debounced removal check for the tracked identity
    fn check_removal(&mut self, frame: &Frame, identity: &CodeIdentity) {
        if self.scanner.verify(frame, identity) {
            self.state.consecutive_misses = 0;
            return;
        }

        self.state.consecutive_misses += 1;
        tracing::trace!(
            misses = self.state.consecutive_misses,
            data = %identity.data,
            "Tracked code missed"
        );

        if self.state.consecutive_misses >= self.frames_to_consider_removed {
            tracing::info!(
                symbology = %identity.symbology,
                data = %identity.data,
                "Code removed"
            );
            self.state.tracked = None;
            self.state.consecutive_misses = 0;
            self.emit(None);
        }
    }

    fn emit_appearance(&self, record: CodeRecord) {
        tracing::info!(
            symbology = %record.symbology,
            data = %record.data,
            "Code detected"
        );
        self.emit(Some(record));
    }

    /// Deliver one event; sink failures are logged and swallowed
    fn emit(&self, event: Option<CodeRecord>) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.on_code_event(event) {
                tracing::error!(error = %e, "Event sink failed");
            }
        }
    }
}
