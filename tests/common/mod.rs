//! Shared test doubles for the integration flows

use codewatch::{
    CaptureError, CodeRecord, CodeRect, DecodeResult, DecodedSymbol, Decoder, EventSink,
    FrameSource, ScannerConfig, SinkError, Symbology,
};
use image::{GrayImage, Rgb, RgbImage};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shrunk timings so paused-clock tests move fast
pub fn test_config() -> ScannerConfig {
    ScannerConfig {
        detection_interval: Duration::from_millis(10),
        idle_sleep: Duration::from_millis(1),
        capture_backoff: Duration::from_millis(5),
        frames_to_consider_removed: 3,
        source_warmup: Duration::ZERO,
        shutdown_timeout: Duration::from_millis(100),
    }
}

/// Surface loop logs when RUST_LOG is set
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Poll a condition while virtual time advances
pub async fn wait_for(label: &str, mut check: impl FnMut() -> bool) {
    for _ in 0..2000 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {label}");
}

/// Counters and knobs shared with a [`ScriptedSource`] after it moves into
/// the scanner
pub struct SourceHandles {
    pub starts: Arc<AtomicUsize>,
    pub stops: Arc<AtomicUsize>,
    pub pulls: Arc<AtomicUsize>,
    pub fail_next: Arc<AtomicUsize>,
    pub fail_start: Arc<AtomicBool>,
}

/// Frame source with scriptable failures and call counters
pub struct ScriptedSource {
    started: bool,
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
    pulls: Arc<AtomicUsize>,
    fail_next: Arc<AtomicUsize>,
    fail_start: Arc<AtomicBool>,
}

impl ScriptedSource {
    pub fn new() -> (Self, SourceHandles) {
        let handles = SourceHandles {
            starts: Arc::new(AtomicUsize::new(0)),
            stops: Arc::new(AtomicUsize::new(0)),
            pulls: Arc::new(AtomicUsize::new(0)),
            fail_next: Arc::new(AtomicUsize::new(0)),
            fail_start: Arc::new(AtomicBool::new(false)),
        };
        let source = Self {
            started: false,
            starts: handles.starts.clone(),
            stops: handles.stops.clone(),
            pulls: handles.pulls.clone(),
            fail_next: handles.fail_next.clone(),
            fail_start: handles.fail_start.clone(),
        };
        (source, handles)
    }
}

impl FrameSource for ScriptedSource {
    fn start(&mut self) -> Result<(), CaptureError> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(CaptureError::OpenFailed("scripted start failure".to_string()));
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.started = true;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<RgbImage, CaptureError> {
        if !self.started {
            return Err(CaptureError::NotStarted);
        }
        self.pulls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(CaptureError::CaptureFailed("scripted pull failure".to_string()));
        }

        Ok(RgbImage::from_pixel(32, 24, Rgb([127, 127, 127])))
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.started = false;
    }
}

/// Knobs shared with a [`MockDecoder`] after it moves into the scanner
pub struct DecoderHandles {
    pub answer: Arc<Mutex<Option<String>>>,
    pub calls: Arc<AtomicUsize>,
}

impl DecoderHandles {
    pub fn show(&self, data: &str) {
        *self.answer.lock().unwrap() = Some(data.to_string());
    }

    pub fn hide(&self) {
        *self.answer.lock().unwrap() = None;
    }
}

/// Decoder whose current answer the test flips at will
pub struct MockDecoder {
    family: Symbology,
    answer: Arc<Mutex<Option<String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockDecoder {
    pub fn new(tag: &str) -> (Self, DecoderHandles) {
        let handles = DecoderHandles {
            answer: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
        };
        let decoder = Self {
            family: Symbology::new(tag),
            answer: handles.answer.clone(),
            calls: handles.calls.clone(),
        };
        (decoder, handles)
    }
}

impl Decoder for MockDecoder {
    fn symbology(&self) -> Symbology {
        self.family.clone()
    }

    fn decode(&self, _image: &GrayImage) -> DecodeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answer.lock().unwrap().clone() {
            Some(data) => Ok(vec![DecodedSymbol {
                data,
                rect: CodeRect {
                    x: 4,
                    y: 4,
                    width: 16,
                    height: 16,
                },
                points: Vec::new(),
            }]),
            None => Ok(Vec::new()),
        }
    }
}

/// Sink that records every delivery
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Option<CodeRecord>>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event payloads seen so far (data text, None for removals)
    pub fn events(&self) -> Vec<Option<String>> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.as_ref().map(|r| r.data.clone()))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl EventSink for RecordingSink {
    fn on_code_event(&self, event: Option<CodeRecord>) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
