use crate::error::{Result, StreamError};
use crate::stream::Stream;

/// Growable in-memory byte stream with a movable cursor.
///
/// Reads and writes share one cursor. Seeking past the end is allowed;
/// the gap is zero-filled when the next write lands beyond the current
/// size. Always readable and writable until closed.
#[derive(Debug, Default)]
pub struct MemoryStream {
    data: Vec<u8>,
    pos: usize,
    closed: bool,
}

impl MemoryStream {
    /// Empty stream with the cursor at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream backed by `data`, cursor at zero.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            closed: false,
        }
    }

    /// Borrow the underlying bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the stream, returning the underlying bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl Stream for MemoryStream {
    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let available = self.data.len().saturating_sub(self.pos);
        let n = available.min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        if self.pos > self.data.len() {
            // zero-fill the gap left by a seek past the end
            self.data.resize(self.pos, 0);
        }
        let end = self.pos + buf.len();
        if end <= self.data.len() {
            self.data[self.pos..end].copy_from_slice(buf);
        } else {
            let overlap = self.data.len() - self.pos;
            self.data[self.pos..].copy_from_slice(&buf[..overlap]);
            self.data.extend_from_slice(&buf[overlap..]);
        }
        self.pos = end;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        Ok(())
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.pos = pos as usize;
        Ok(())
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.pos as u64)
    }

    fn size(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn truncate(&mut self, len: u64) -> Result<()> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.data.resize(len as usize, 0);
        self.pos = self.pos.min(self.data.len());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn can_read(&self) -> bool {
        !self.closed
    }

    fn can_write(&self) -> bool {
        !self.closed
    }
}
