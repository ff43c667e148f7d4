//! Flow-controlled output sinks.
//!
//! Writers in this crate never touch a transport directly. They talk to an
//! [`OutputSink`], which hands out writable regions, accepts commits of the
//! bytes actually used and pushes committed bytes toward the transport when
//! asked to flush. Only `flush` may suspend.
//!
//! [`BufferedSink`] adapts any [`tokio::io::AsyncWrite`] to this contract and
//! [`SharedSink`] lets several tasks take turns owning one sink.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use crate::error::{Result, WireError};

mod buffered;
mod shared;

pub use buffered::BufferedSink;
pub use shared::{SharedSink, SinkGuard};

/// Bytes requested per step when pumping a body into a sink.
pub const COPY_CHUNK_SIZE: usize = 16 * 1024;

/// Buffered byte destination with reserve/commit/flush semantics.
///
/// A caller reserves a region, writes into it, commits the prefix it used and
/// eventually flushes. Reserving again before committing abandons the earlier
/// reservation.
#[async_trait]
pub trait OutputSink: Send {
    /// Return a contiguous writable region of at least `min_bytes`.
    ///
    /// Never suspends. May allocate or grow internal buffers.
    fn reserve(&mut self, min_bytes: usize) -> &mut [u8];

    /// Mark the first `n_bytes` of the last reserved region as ready to send.
    ///
    /// # Panics
    ///
    /// Implementations panic if `n_bytes` exceeds the last reservation.
    fn commit(&mut self, n_bytes: usize);

    /// Push committed bytes toward the transport.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Io`] if the transport fails and
    /// [`WireError::Cancelled`] if `cancel` fires first. Bytes not yet
    /// accepted by the transport stay pending for the next flush.
    async fn flush(&mut self, cancel: &CancellationToken) -> Result<()>;
}

#[async_trait]
impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn reserve(&mut self, min_bytes: usize) -> &mut [u8] { (**self).reserve(min_bytes) }

    fn commit(&mut self, n_bytes: usize) { (**self).commit(n_bytes) }

    async fn flush(&mut self, cancel: &CancellationToken) -> Result<()> {
        (**self).flush(cancel).await
    }
}

#[async_trait]
impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn reserve(&mut self, min_bytes: usize) -> &mut [u8] { (**self).reserve(min_bytes) }

    fn commit(&mut self, n_bytes: usize) { (**self).commit(n_bytes) }

    async fn flush(&mut self, cancel: &CancellationToken) -> Result<()> {
        (**self).flush(cancel).await
    }
}

/// Read once from `body` into `buf`, aborting if `cancel` fires first.
pub(crate) async fn read_cancellable<R>(
    body: &mut R,
    buf: &mut [u8],
    cancel: &CancellationToken,
) -> Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::debug!("body read cancelled");
            Err(WireError::Cancelled)
        }
        read = body.read(buf) => Ok(read?),
    }
}

/// Copy every byte of `body` into `sink` without flushing.
///
/// Each step reserves [`COPY_CHUNK_SIZE`] bytes, reads directly into the
/// reservation and commits what was read, so the body never passes through
/// an intermediate buffer. Returns the number of bytes copied.
///
/// # Errors
///
/// Propagates read errors from `body` unchanged and returns
/// [`WireError::Cancelled`] if `cancel` fires during a read.
pub async fn copy_to_sink<R, S>(body: &mut R, sink: &mut S, cancel: &CancellationToken) -> Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    S: OutputSink + ?Sized,
{
    let mut copied = 0u64;
    loop {
        let region = sink.reserve(COPY_CHUNK_SIZE);
        let read = read_cancellable(body, &mut region[..COPY_CHUNK_SIZE], cancel).await?;
        if read == 0 {
            return Ok(copied);
        }
        sink.commit(read);
        copied += read as u64;
    }
}
