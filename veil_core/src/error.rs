use thiserror::Error;

use crate::codec::CodecError;

/// Result type alias for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

/// Errors surfaced by [`Stream`](crate::Stream) operations.
///
/// Nothing is retried or swallowed internally: a child-stream I/O failure
/// or a codec failure propagates unchanged to the caller of the operation
/// that triggered it.
#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O error from the underlying medium, propagated unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a read could be fully satisfied.
    #[error("end of stream: requested {requested} bytes, only {available} available")]
    EndOfStream { requested: usize, available: usize },

    /// The codec reported corrupt input or broken internal state.
    #[error("compression error: {0}")]
    Codec(#[from] CodecError),

    /// The operation is not supported by this stream type. Calling it is
    /// always an error, never a silent no-op.
    #[error("{operation}(): unsupported on this stream")]
    Unsupported { operation: &'static str },

    /// The stream has been closed; no further read or write is permitted.
    #[error("stream is closed")]
    Closed,
}
