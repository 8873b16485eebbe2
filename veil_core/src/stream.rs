use crate::error::{Result, StreamError};

/// Abstract sequential byte stream with optional random access.
///
/// # Read contract
/// [`read_some`] is the primitive every implementation provides: it reads
/// *up to* `buf.len()` bytes and reports how many, with `Ok(0)` meaning
/// the stream has cleanly ended. [`read`] builds the exact-fill contract
/// on top: it fills its buffer completely or fails with
/// [`StreamError::EndOfStream`] — a short, silently-partial result is
/// never returned to the caller.
///
/// # Write contract
/// [`write`] accepts every byte or fails with [`StreamError::Io`].
///
/// # Random access
/// [`seek`], [`tell`], [`size`], and [`truncate`] may be unsupported by a
/// stream type; such a stream fails them unconditionally with
/// [`StreamError::Unsupported`] rather than silently ignoring the call.
///
/// # Lifecycle
/// [`close`] is idempotent. After it returns, [`is_closed`] reports true
/// and every read or write fails with [`StreamError::Closed`].
///
/// [`read_some`]: Stream::read_some
/// [`read`]: Stream::read
/// [`write`]: Stream::write
/// [`seek`]: Stream::seek
/// [`tell`]: Stream::tell
/// [`size`]: Stream::size
/// [`truncate`]: Stream::truncate
/// [`close`]: Stream::close
/// [`is_closed`]: Stream::is_closed
pub trait Stream {
    /// Read up to `buf.len()` bytes, returning how many were read.
    ///
    /// `Ok(0)` signals the end of the stream (never an empty wait).
    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Fill `buf` exactly, or fail without returning a partial result.
    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read_some(&mut buf[filled..])? {
                0 => {
                    return Err(StreamError::EndOfStream {
                        requested: buf.len(),
                        available: filled,
                    })
                }
                n => filled += n,
            }
        }
        Ok(())
    }

    /// Write all of `buf`, or fail.
    fn write(&mut self, buf: &[u8]) -> Result<()>;

    /// Force internally buffered bytes down to the underlying medium.
    fn flush(&mut self) -> Result<()>;

    /// Move the cursor to the absolute position `pos`.
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// Current cursor position.
    fn tell(&mut self) -> Result<u64>;

    /// Total size of the stream in bytes.
    fn size(&self) -> Result<u64>;

    /// Grow or shrink the stream to exactly `len` bytes.
    fn truncate(&mut self, len: u64) -> Result<()>;

    /// Close the stream. Idempotent; disables further read and write.
    fn close(&mut self) -> Result<()>;

    /// Whether [`close`](Stream::close) has run.
    fn is_closed(&self) -> bool;

    /// Whether the stream can currently serve reads.
    fn can_read(&self) -> bool;

    /// Whether the stream can currently serve writes.
    fn can_write(&self) -> bool;
}
