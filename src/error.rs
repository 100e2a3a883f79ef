//! Error handling for the code scanner

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Config error (empty or inconsistent decoder set)
    #[error("Config error: {0}")]
    Config(String),

    /// Frame source error surfaced through start()
    #[error("Capture error: {0}")]
    Capture(#[from] crate::source::CaptureError),
}
