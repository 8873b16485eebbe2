use thiserror::Error;

/// Errors reported by an incremental codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The compressed input is malformed. Unrecoverable for this stream.
    #[error("corrupt compressed data: {0}")]
    Corrupt(String),

    /// The codec's internal state is broken (library error, stalled
    /// state machine). Unrecoverable for this stream.
    #[error("codec internal error: {0}")]
    Internal(String),
}

/// Outcome of one [`Encoder::encode`] step.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeStep {
    /// Input bytes the encoder accepted.
    pub consumed: usize,
    /// Output bytes written into the caller's buffer.
    pub produced: usize,
}

/// Outcome of one [`Decoder::decode`] step.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeStep {
    /// Compressed input bytes the decoder accepted.
    pub consumed: usize,
    /// Decompressed bytes written into the caller's buffer.
    pub produced: usize,
    /// True once the complete stream — including any container trailer —
    /// has been seen and verified. Further input belongs to nothing.
    pub ended: bool,
}

/// Incremental compression state machine.
///
/// Implementations accept input and emit output in arbitrarily sized
/// chunks across multiple calls, keeping whatever internal state the
/// underlying library needs between calls. An encoder instance drives
/// exactly one logical stream; there is no reset.
pub trait Encoder: Send {
    /// Compress as much of `input` as fits into `output`.
    ///
    /// Either `consumed` or `produced` (or both) advances on every call
    /// with non-empty input and available output space; a step that makes
    /// no progress under those conditions is a [`CodecError::Internal`].
    /// Output may lag input: the encoder is free to buffer data
    /// internally for better ratios across small writes.
    fn encode(&mut self, input: &[u8], output: &mut [u8]) -> Result<EncodeStep, CodecError>;

    /// Emit pending buffered output without ending the stream.
    ///
    /// Returns the number of bytes written into `output`. Callers loop
    /// while the output buffer fills completely; a short count means the
    /// flush is complete and writing may continue afterward.
    fn flush(&mut self, output: &mut [u8]) -> Result<usize, CodecError>;

    /// Finalize the stream: drain remaining buffered output and emit the
    /// end-of-stream marker plus any container trailer.
    ///
    /// Returns the bytes written and whether finalization is complete.
    /// Callers loop until `true`; no other method may be called after.
    fn finish(&mut self, output: &mut [u8]) -> Result<(usize, bool), CodecError>;
}

/// Incremental decompression state machine, the mirror of [`Encoder`].
pub trait Decoder: Send {
    /// Decompress from `input` into `output`.
    ///
    /// Consumes and produces as much as the buffers allow. A step with
    /// zero `consumed` and zero `produced` signals that the decoder needs
    /// more input than `input` holds. Once [`DecodeStep::ended`] is
    /// reported the decoder stays ended and produces nothing further.
    fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<DecodeStep, CodecError>;
}
