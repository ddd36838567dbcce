//! Error types for the GrooveWake engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The pose source could not be brought up at all. Fatal: no core
    /// behavior can proceed without a pose stream.
    #[error("pose source startup failed: {0}")]
    SourceStartup(String),

    /// A single frame could not be captured. Transient: the loop skips the
    /// frame and continues.
    #[error("frame capture error: {0}")]
    FrameCapture(String),

    #[error("pose source stalled: no frame within {duration_ms}ms")]
    FrameTimeout { duration_ms: u64 },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
