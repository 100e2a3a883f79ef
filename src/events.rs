//! Event delivery seam
//!
//! Appearance/removal events reach the consumer through one synchronous
//! callback invoked from the capture task. A slow sink directly delays
//! subsequent capture cycles.

use crate::models::CodeRecord;

/// Error a sink may surface; logged and swallowed by the scanner
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Consumer-registered callback for detection events
///
/// `Some(record)` reports an appearance, `None` reports removal of the
/// tracked code. Must return quickly. Errors never terminate the capture
/// loop.
pub trait EventSink: Send + Sync {
    /// Deliver one event
    fn on_code_event(&self, event: Option<CodeRecord>) -> Result<(), SinkError>;
}

/// Plain closures act as infallible sinks
impl<F> EventSink for F
where
    F: Fn(Option<CodeRecord>) + Send + Sync,
{
    fn on_code_event(&self, event: Option<CodeRecord>) -> Result<(), SinkError> {
        self(event);
        Ok(())
    }
}
