use crate::codec::{CodecError, Decoder, Encoder};
use crate::error::{Result, StreamError};
use crate::stream::Stream;

/// Size of the two scratch buffers relaying bytes between the codec and
/// the child stream. The larger, the fewer child round-trips.
pub const SCRATCH_LEN: usize = 32 * 1024;

/// Transparent compression/decompression stream.
///
/// Wraps exactly one child [`Stream`]: writes are compressed before they
/// reach the child, reads decompress what the child yields. The consumer
/// drives it through the same `Stream` contract as any uncompressed
/// stream.
///
/// # Session contract
/// One adapter instance serves one direction per logical session —
/// either all reads or all writes. Mixing directions on the same
/// instance is a caller contract violation with unspecified results.
///
/// # Write path
/// Each [`write`] feeds the encoder and pushes every produced scratch
/// chunk to the child. Some input may remain buffered inside the encoder
/// until [`flush`] or [`close`]; that lag is what lets the codec find
/// matches across small writes.
///
/// # Read path
/// Each read drains the decoder, pulling compressed chunks from the
/// child whenever the staged window runs dry. [`Stream::read`] fills its
/// buffer exactly or fails; [`read_some`] returns short counts once the
/// compressed stream cleanly ends.
///
/// # Finalization
/// [`close`] finalizes the compressed stream (end-of-stream marker,
/// container trailer) if anything was written, and is idempotent. The
/// child stream is never closed here — its lifetime belongs to the
/// caller, which the `&mut` borrow enforces. Dropping an unclosed
/// adapter closes it; a finalization failure on that path is logged
/// rather than propagated.
///
/// # No random access
/// `seek`, `tell`, `size`, and `truncate` always fail with
/// [`StreamError::Unsupported`]: block compression is not
/// seek-addressable without an index, so the stream is forward-only.
///
/// [`write`]: Stream::write
/// [`flush`]: Stream::flush
/// [`close`]: Stream::close
/// [`read_some`]: Stream::read_some
pub struct CompressionStream<'c> {
    child: &'c mut dyn Stream,
    encoder: Box<dyn Encoder>,
    decoder: Box<dyn Decoder>,
    /// Stages encoder output on its way to the child.
    write_scratch: Box<[u8]>,
    /// Stages compressed bytes read from the child, not yet decoded.
    read_scratch: Box<[u8]>,
    /// Valid window of `read_scratch`.
    staged_start: usize,
    staged_end: usize,
    child_eof: bool,
    has_written: bool,
    closed: bool,
}

impl<'c> CompressionStream<'c> {
    /// Wrap `child` with the given codec pair.
    ///
    /// Nothing touches the child until the first write (no container
    /// header is emitted up front) or the first read.
    pub fn new(
        child: &'c mut dyn Stream,
        encoder: Box<dyn Encoder>,
        decoder: Box<dyn Decoder>,
    ) -> Self {
        Self {
            child,
            encoder,
            decoder,
            write_scratch: vec![0u8; SCRATCH_LEN].into_boxed_slice(),
            read_scratch: vec![0u8; SCRATCH_LEN].into_boxed_slice(),
            staged_start: 0,
            staged_end: 0,
            child_eof: false,
            has_written: false,
            closed: false,
        }
    }

    /// The wrapped child stream.
    pub fn child(&self) -> &dyn Stream {
        &*self.child
    }

    /// Drive the encoder to completion, pushing every chunk to the child.
    fn finalize(&mut self) -> Result<()> {
        loop {
            let (produced, done) = self.encoder.finish(&mut self.write_scratch)?;
            if produced > 0 {
                self.child.write(&self.write_scratch[..produced])?;
            }
            if done {
                return Ok(());
            }
            if produced == 0 {
                return Err(CodecError::Internal("encoder stalled during finish".into()).into());
            }
        }
    }
}

impl Stream for CompressionStream<'_> {
    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        if !self.child.can_read() {
            return Err(StreamError::Unsupported { operation: "read" });
        }
        if buf.is_empty() {
            return Ok(0);
        }
        let mut filled = 0;
        loop {
            let staged = &self.read_scratch[self.staged_start..self.staged_end];
            let step = self.decoder.decode(staged, &mut buf[filled..])?;
            self.staged_start += step.consumed;
            filled += step.produced;
            if step.ended || filled == buf.len() {
                return Ok(filled);
            }
            if self.staged_start == self.staged_end {
                // decoder is starved; pull the next compressed chunk
                if !self.child_eof {
                    let n = self.child.read_some(&mut self.read_scratch)?;
                    self.staged_start = 0;
                    self.staged_end = n;
                    if n > 0 {
                        continue;
                    }
                    self.child_eof = true;
                }
                // child exhausted mid-stream: surface what we have, then fail
                if filled > 0 {
                    return Ok(filled);
                }
                return Err(StreamError::EndOfStream {
                    requested: buf.len(),
                    available: 0,
                });
            }
            if step.consumed == 0 && step.produced == 0 {
                return Err(CodecError::Internal("decoder made no progress".into()).into());
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        if !self.child.can_write() {
            return Err(StreamError::Unsupported { operation: "write" });
        }
        // set even for an empty write: close() must still finalize a
        // valid (empty-payload) compressed stream afterwards
        self.has_written = true;
        let mut input = buf;
        while !input.is_empty() {
            let step = self.encoder.encode(input, &mut self.write_scratch)?;
            if step.produced > 0 {
                self.child.write(&self.write_scratch[..step.produced])?;
            }
            input = &input[step.consumed..];
            if step.consumed == 0 && step.produced == 0 {
                return Err(CodecError::Internal("encoder made no progress".into()).into());
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        if self.has_written {
            // a completely filled scratch means the encoder may hold more
            loop {
                let produced = self.encoder.flush(&mut self.write_scratch)?;
                if produced > 0 {
                    self.child.write(&self.write_scratch[..produced])?;
                }
                if produced < self.write_scratch.len() {
                    break;
                }
            }
        }
        self.child.flush()
    }

    fn seek(&mut self, _pos: u64) -> Result<()> {
        Err(StreamError::Unsupported { operation: "seek" })
    }

    fn tell(&mut self) -> Result<u64> {
        Err(StreamError::Unsupported { operation: "tell" })
    }

    fn size(&self) -> Result<u64> {
        Err(StreamError::Unsupported { operation: "size" })
    }

    fn truncate(&mut self, _len: u64) -> Result<()> {
        Err(StreamError::Unsupported {
            operation: "truncate",
        })
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        // mark first: a failed finalize must not run again on drop
        self.closed = true;
        if self.has_written {
            self.finalize()?;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn can_read(&self) -> bool {
        self.child.can_read()
    }

    fn can_write(&self) -> bool {
        self.child.can_write()
    }
}

impl Drop for CompressionStream<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!("failed to finalize compressed stream on drop: {err}");
        }
    }
}
