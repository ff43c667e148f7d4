//! [`OutputSink`] adapter over a Tokio writer.

use std::io;

use async_trait::async_trait;
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use super::OutputSink;
use crate::error::{Result, WireError};

/// Buffers committed bytes in memory and writes them to `W` on flush.
///
/// Backpressure comes from the wrapped writer: `flush` suspends for as long
/// as `W` does. Only bytes acknowledged by `W` leave the buffer, so a
/// cancelled or failed flush can be retried without losing data.
///
/// # Examples
///
/// ```
/// use tokio_util::sync::CancellationToken;
/// use wirewriter::sink::{BufferedSink, OutputSink};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> wirewriter::Result<()> {
/// let mut sink = BufferedSink::new(Vec::new());
/// let region = sink.reserve(5);
/// region[..5].copy_from_slice(b"hello");
/// sink.commit(5);
/// sink.flush(&CancellationToken::new()).await?;
/// assert_eq!(sink.get_ref(), b"hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BufferedSink<W> {
    inner: W,
    buffer: BytesMut,
    committed: usize,
    reserved: usize,
}

impl<W> BufferedSink<W> {
    /// Wrap `inner` with an empty buffer.
    pub fn new(inner: W) -> Self { Self::with_capacity(inner, 0) }

    /// Wrap `inner`, preallocating `capacity` bytes of buffer space.
    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        Self {
            inner,
            buffer: BytesMut::with_capacity(capacity),
            committed: 0,
            reserved: 0,
        }
    }

    /// Number of committed bytes not yet accepted by the writer.
    #[must_use]
    pub fn pending(&self) -> usize { self.committed }

    /// Borrow the wrapped writer.
    pub fn get_ref(&self) -> &W { &self.inner }

    /// Mutably borrow the wrapped writer.
    pub fn get_mut(&mut self) -> &mut W { &mut self.inner }

    /// Consume the sink, returning the writer. Unflushed bytes are dropped.
    pub fn into_inner(self) -> W { self.inner }

    fn discard_reservation(&mut self) {
        self.buffer.truncate(self.committed);
        self.reserved = 0;
    }
}

#[async_trait]
impl<W> OutputSink for BufferedSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn reserve(&mut self, min_bytes: usize) -> &mut [u8] {
        self.discard_reservation();
        self.buffer.resize(self.committed + min_bytes, 0);
        self.reserved = min_bytes;
        &mut self.buffer[self.committed..]
    }

    fn commit(&mut self, n_bytes: usize) {
        assert!(
            n_bytes <= self.reserved,
            "commit of {n_bytes} bytes exceeds reservation of {}",
            self.reserved
        );
        self.committed += n_bytes;
        self.discard_reservation();
    }

    async fn flush(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.discard_reservation();
        while self.committed > 0 {
            let written = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(cancelled()),
                written = self.inner.write(&self.buffer[..self.committed]) => written,
            };
            let written = match written {
                Ok(0) => return Err(flush_failed(io::ErrorKind::WriteZero.into())),
                Ok(n) => n,
                Err(error) => return Err(flush_failed(error)),
            };
            self.buffer.advance(written);
            self.committed -= written;
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(cancelled()),
            flushed = self.inner.flush() => flushed.map_err(flush_failed),
        }
    }
}

fn cancelled() -> WireError {
    tracing::debug!("sink flush cancelled");
    WireError::Cancelled
}

fn flush_failed(error: io::Error) -> WireError {
    tracing::debug!(%error, "sink flush failed");
    crate::metrics::inc_flush_errors();
    WireError::Io(error)
}
