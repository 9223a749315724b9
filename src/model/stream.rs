//! Byte streams the parser reads from.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::error::{ModelError, ModelResult};

/// Host storage primitive: sequential reads, relative seeks and an explicit
/// close.
pub trait ByteStream {
    /// Read up to `buf.len()` bytes. `Ok(0)` means end of stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Move the read position by `offset` bytes.
    fn seek_relative(&mut self, offset: i64) -> io::Result<()>;

    /// Release the underlying handle.
    fn close(&mut self) -> io::Result<()>;
}

/// Any `Read + Seek` source, e.g. a file or an in-memory cursor.
#[derive(Debug)]
pub struct IoStream<R> {
    inner: Option<R>,
}

impl<R: Read + Seek> IoStream<R> {
    pub fn new(inner: R) -> Self {
        Self { inner: Some(inner) }
    }

    fn inner(&mut self) -> io::Result<&mut R> {
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stream already closed"))
    }
}

impl IoStream<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read + Seek> ByteStream for IoStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner()?.read(buf)
    }

    fn seek_relative(&mut self, offset: i64) -> io::Result<()> {
        self.inner()?.seek(SeekFrom::Current(offset)).map(|_| ())
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner = None;
        Ok(())
    }
}

/// Owns a stream for the length of a parse and closes it exactly once,
/// whichever way the parse ends.
pub(crate) struct StreamGuard<S: ByteStream> {
    stream: S,
    offset: u64,
    closed: bool,
}

impl<S: ByteStream> StreamGuard<S> {
    pub(crate) fn new(stream: S) -> Self {
        Self {
            stream,
            offset: 0,
            closed: false,
        }
    }

    /// Bytes consumed so far.
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    /// Fill `buf` completely or fail with `UnexpectedEof`.
    pub(crate) fn read_exact(&mut self, buf: &mut [u8]) -> ModelResult<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(ModelError::UnexpectedEof {
                        offset: self.offset + filled as u64,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.offset += filled as u64;
        Ok(())
    }

    /// Read one byte, `None` at end of stream.
    pub(crate) fn read_byte(&mut self) -> ModelResult<Option<u8>> {
        let mut b = [0u8; 1];
        loop {
            match self.stream.read(&mut b) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(b[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub(crate) fn skip(&mut self, count: u64) -> ModelResult<()> {
        let offset = i64::try_from(count).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "skip length out of range")
        })?;
        self.stream.seek_relative(offset)?;
        self.offset += count;
        Ok(())
    }

    /// Close the stream, reporting a close failure only if the parse itself
    /// succeeded.
    pub(crate) fn finish<T>(mut self, result: ModelResult<T>) -> ModelResult<T> {
        self.closed = true;
        let closed = self.stream.close();
        let value = result?;
        closed?;
        Ok(value)
    }
}

impl<S: ByteStream> Drop for StreamGuard<S> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.stream.close();
        }
    }
}
