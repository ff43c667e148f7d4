//! Read adapter capped at a declared length.
//!
//! [`SizedReader`] enforces a `Content-Length` style bound over any byte
//! source: whatever the source would produce, the reader never yields more
//! than the declared number of bytes and never calls the source again once
//! the bound is reached.

use std::{
    io::{self, Read, Seek, SeekFrom},
    pin::Pin,
    task::{Context, Poll, ready},
};

use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};

/// A forward-only reader that yields at most `len` bytes from `inner`.
///
/// # Examples
///
/// ```
/// use std::io::Read;
///
/// use wirewriter::sized::SizedReader;
///
/// let mut reader = SizedReader::new(&b"hello world"[..], 5);
/// let mut out = String::new();
/// reader.read_to_string(&mut out).expect("read");
/// assert_eq!(out, "hello");
/// ```
#[derive(Debug)]
pub struct SizedReader<R> {
    inner: R,
    len: u64,
    delivered: u64,
}

impl<R> SizedReader<R> {
    /// Bound `inner` to `len` bytes.
    pub fn new(inner: R, len: u64) -> Self {
        Self {
            inner,
            len,
            delivered: 0,
        }
    }

    /// Declared length of the stream.
    #[must_use]
    pub fn len(&self) -> u64 { self.len }

    /// Returns true if the declared length is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Bytes delivered so far.
    #[must_use]
    pub fn position(&self) -> u64 { self.delivered }

    /// Bytes that may still be delivered.
    #[must_use]
    pub fn remaining(&self) -> u64 { self.len - self.delivered }

    /// Returns true once the declared length has been delivered.
    #[must_use]
    pub fn is_exhausted(&self) -> bool { self.remaining() == 0 }

    /// Borrow the wrapped source.
    pub fn get_ref(&self) -> &R { &self.inner }

    /// Consume the adapter, returning the wrapped source.
    pub fn into_inner(self) -> R { self.inner }

    /// Clamp a request of `requested` bytes to the remaining budget.
    fn clamp(&self, requested: usize) -> usize {
        usize::try_from(self.remaining()).map_or(requested, |remaining| remaining.min(requested))
    }

    fn record(&mut self, read: usize) {
        self.delivered += read as u64;
        debug_assert!(self.delivered <= self.len, "source overran its buffer");
    }

    fn seek_position(&self, pos: SeekFrom) -> io::Result<u64> {
        match pos {
            SeekFrom::Current(0) => Ok(self.delivered),
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                crate::error::WireError::Unsupported { operation: "seek" },
            )),
        }
    }
}

impl<R: Read> Read for SizedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = self.clamp(buf.len());
        if limit == 0 {
            return Ok(0);
        }
        let read = self.inner.read(&mut buf[..limit])?;
        self.record(read);
        Ok(read)
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for SizedReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let limit = self.clamp(buf.remaining());
        if limit == 0 {
            return Poll::Ready(Ok(()));
        }
        let mut limited = ReadBuf::new(buf.initialize_unfilled_to(limit));
        ready!(Pin::new(&mut self.inner).poll_read(cx, &mut limited))?;
        let read = limited.filled().len();
        buf.advance(read);
        self.record(read);
        Poll::Ready(Ok(()))
    }
}

/// Position queries succeed; any attempt to move the position fails.
impl<R> Seek for SizedReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> { self.seek_position(pos) }
}

impl<R: Unpin> AsyncSeek for SizedReader<R> {
    fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
        self.seek_position(position).map(|_| ())
    }

    fn poll_complete(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        Poll::Ready(Ok(self.delivered))
    }
}
