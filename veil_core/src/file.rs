use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Result, StreamError};
use crate::stream::Stream;

/// File-backed stream.
///
/// [`open`] yields a read-only stream, [`create`] a write-only one;
/// the capability queries reflect the open mode. Closing drops the file
/// handle, so `close()` releases the descriptor immediately rather than
/// waiting for the stream to be dropped.
///
/// [`open`]: FileStream::open
/// [`create`]: FileStream::create
#[derive(Debug)]
pub struct FileStream {
    file: Option<File>,
    readable: bool,
    writable: bool,
}

impl FileStream {
    /// Open an existing file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            file: Some(file),
            readable: true,
            writable: false,
        })
    }

    /// Create (or overwrite) a file for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            file: Some(file),
            readable: false,
            writable: true,
        })
    }

    fn file(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or(StreamError::Closed)
    }
}

impl Stream for FileStream {
    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.readable {
            return Err(StreamError::Unsupported { operation: "read" });
        }
        Ok(self.file()?.read(buf)?)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if !self.writable {
            return Err(StreamError::Unsupported { operation: "write" });
        }
        Ok(self.file()?.write_all(buf)?)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.file()?.flush()?)
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.file()?.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.file()?.seek(SeekFrom::Current(0))?)
    }

    fn size(&self) -> Result<u64> {
        match &self.file {
            Some(file) => Ok(file.metadata()?.len()),
            None => Err(StreamError::Closed),
        }
    }

    fn truncate(&mut self, len: u64) -> Result<()> {
        if !self.writable {
            return Err(StreamError::Unsupported {
                operation: "truncate",
            });
        }
        self.file()?.set_len(len)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.file = None;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    fn can_read(&self) -> bool {
        self.readable && self.file.is_some()
    }

    fn can_write(&self) -> bool {
        self.writable && self.file.is_some()
    }
}
