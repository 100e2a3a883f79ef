//! CodeScanner - Capture Loop and Control Surface
//!
//! ## Responsibilities
//!
//! - Own the background capture loop (one repeating task, no overlap)
//! - Serialize control calls (set_mode/trigger) against detection ticks
//! - Bounded-timeout shutdown that always tries to release the source

use crate::config::ScannerConfig;
use crate::decoder::{Decoder, DecoderSet};
use crate::detection::DetectionStateMachine;
use crate::error::Result;
use crate::events::EventSink;
use crate::frame_buffer::FrameBuffer;
use crate::models::{CodeIdentity, DetectionMode};
use crate::scanner::Scanner;
use crate::source::{Frame, FrameSource};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};

/// State shared between the public handle and the capture task
struct Shared {
    config: ScannerConfig,
    buffer: FrameBuffer,
    /// Single exclusion guard for ticks, triggers and mode switches
    machine: Mutex<DetectionStateMachine>,
    source: Mutex<Box<dyn FrameSource>>,
    running: RwLock<bool>,
}

/// Public scanner handle
///
/// Wires an already-initialized frame source to a decoder capability set;
/// `start` spawns the capture loop, `stop` tears it down within a bounded
/// timeout. All control calls are safe to issue concurrently with the loop.
pub struct CodeScanner {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for CodeScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeScanner").finish_non_exhaustive()
    }
}

impl CodeScanner {
    /// Create a scanner
    ///
    /// Fails with a config error when the decoder set is empty or two
    /// decoders claim the same family; no resources are held on failure.
    pub fn new(
        source: Box<dyn FrameSource>,
        decoders: Vec<Box<dyn Decoder>>,
        config: ScannerConfig,
    ) -> Result<Self> {
        let set = DecoderSet::new(decoders)?;
        let machine =
            DetectionStateMachine::new(Scanner::new(set), config.frames_to_consider_removed);

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                buffer: FrameBuffer::new(),
                machine: Mutex::new(machine),
                source: Mutex::new(source),
                running: RwLock::new(false),
            }),
            task: Mutex::new(None),
        })
    }

    /// Create with default config
    pub fn with_defaults(
        source: Box<dyn FrameSource>,
        decoders: Vec<Box<dyn Decoder>>,
    ) -> Result<Self> {
        Self::new(source, decoders, ScannerConfig::default())
    }

    /// Register the sink and begin the capture loop
    ///
    /// Idempotent: calling while already running logs a warning and leaves
    /// the current run untouched. A source start failure is propagated and
    /// leaves the scanner stopped.
    pub async fn start(&self, sink: impl EventSink + 'static) -> Result<()> {
        {
            let mut running = self.shared.running.write().await;
            if *running {
                tracing::warn!("Scanner already running");
                return Ok(());
            }
            *running = true;
        }

        let mode = {
            let mut machine = self.shared.machine.lock().await;
            machine.reset_tracking();
            machine.bind_sink(Arc::new(sink));
            machine.mode()
        };

        if let Err(e) = self.shared.source.lock().await.start() {
            *self.shared.running.write().await = false;
            self.shared.machine.lock().await.release_sink();
            return Err(e.into());
        }

        // Give the device time to settle before the first pull.
        if !self.shared.config.source_warmup.is_zero() {
            sleep(self.shared.config.source_warmup).await;
        }

        let shared = self.shared.clone();
        *self.task.lock().await = Some(tokio::spawn(capture_loop(shared)));

        tracing::info!(mode = ?mode, "Code scanner started");
        Ok(())
    }

    /// Stop the capture loop and release the frame source
    ///
    /// Waits up to `shutdown_timeout` for the loop to finish its current
    /// cycle. On timeout the shutdown degrades (warnings logged) but still
    /// releases what it safely can; the detached task exits at its next
    /// running check. After return the sink sees no further events.
    /// Idempotent: a second call is a no-op.
    pub async fn stop(&self) {
        {
            let mut running = self.shared.running.write().await;
            if !*running {
                return;
            }
            *running = false;
        }

        tracing::info!("Stopping code scanner");
        let bound = self.shared.config.shutdown_timeout;

        let handle = self.task.lock().await.take();
        if let Some(handle) = handle {
            match timeout(bound, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Capture loop task failed"),
                Err(_) => tracing::warn!(
                    timeout_ms = bound.as_millis() as u64,
                    "Capture loop did not stop in time; proceeding"
                ),
            }
        }

        // Unbind the sink under the tick guard so nothing can be delivered
        // after this point.
        match timeout(bound, self.shared.machine.lock()).await {
            Ok(mut machine) => {
                machine.release_sink();
                machine.reset_tracking();
            }
            Err(_) => tracing::warn!("Detection state busy past timeout; sink left bound"),
        }

        self.shared.buffer.clear().await;

        match timeout(bound, self.shared.source.lock()).await {
            Ok(mut source) => source.stop(),
            Err(_) => tracing::warn!("Frame source busy past timeout; release skipped"),
        }

        tracing::info!("Code scanner stopped");
    }

    /// Swap detection mode, resetting tracking state
    ///
    /// Atomic with respect to ticks and triggers; usable whether or not the
    /// scanner is running.
    pub async fn set_mode(&self, mode: DetectionMode) {
        self.shared.machine.lock().await.set_mode(mode);
    }

    /// One manual scan of the latest buffered frame (TRIGGERED mode)
    ///
    /// Logged no-op when the scanner is not running, the mode is not
    /// TRIGGERED, or nothing has been captured yet.
    pub async fn trigger(&self) {
        if !*self.shared.running.read().await {
            tracing::warn!("Scanner not running; trigger ignored");
            return;
        }

        // Same exclusion as tick processing; the frame is read only once
        // the guard is held.
        let mut machine = self.shared.machine.lock().await;
        match self.shared.buffer.latest().await {
            Some(frame) => machine.on_trigger(&frame),
            None => tracing::warn!("No frame captured yet; trigger ignored"),
        }
    }

    /// Whether the capture loop is running
    pub async fn is_running(&self) -> bool {
        *self.shared.running.read().await
    }

    /// Current detection mode
    pub async fn mode(&self) -> DetectionMode {
        self.shared.machine.lock().await.mode()
    }

    /// Identity currently considered present (SINGLE mode)
    pub async fn tracked_identity(&self) -> Option<CodeIdentity> {
        self.shared.machine.lock().await.tracked()
    }
}

/// Background capture loop
///
/// One cycle: pull, convert, buffer, tick when eligible, idle. Capture
/// failures back off without ending the loop; only the running flag ends it.
async fn capture_loop(shared: Arc<Shared>) {
    tracing::debug!("Capture loop started");

    let mut last_tick: Option<Instant> = None;
    let mut sequence: u64 = 0;

    loop {
        if !*shared.running.read().await {
            break;
        }

        let pulled = shared.source.lock().await.next_frame();
        let image = match pulled {
            Ok(image) => image,
            Err(e) => {
                tracing::error!(error = %e, "Frame capture failed; backing off");
                sleep(shared.config.capture_backoff).await;
                continue;
            }
        };

        sequence += 1;
        let frame = Frame::from_rgb(&image, sequence);
        shared.buffer.store(frame.clone()).await;

        let eligible = last_tick.map_or(true, |t| t.elapsed() >= shared.config.detection_interval);
        if eligible {
            last_tick = Some(Instant::now());
            shared.machine.lock().await.on_tick(&frame);
        }

        if sequence % 100 == 0 {
            tracing::debug!(frames = sequence, "Capture loop progress");
        }

        sleep(shared.config.idle_sleep).await;
    }

    tracing::debug!(frames = sequence, "Capture loop stopped");
}
