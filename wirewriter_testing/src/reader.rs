//! Scripted body sources.

use std::{
    collections::VecDeque,
    io,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::{AsyncRead, ReadBuf};

/// Reader that hands out `data` in scripted chunk sizes.
///
/// Each poll returns at most the next scripted size (and never more than
/// the caller's buffer). Once the script runs out the remaining data is
/// returned as fast as the caller asks. An optional error is raised once the
/// data is exhausted instead of reporting end of stream.
#[derive(Debug, Default)]
pub struct ChunkedReader {
    data: Vec<u8>,
    offset: usize,
    chunks: VecDeque<usize>,
    error: Option<io::ErrorKind>,
    polls: usize,
}

impl ChunkedReader {
    /// Serve `data` in the given chunk sizes.
    pub fn new(data: impl Into<Vec<u8>>, chunks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            data: data.into(),
            chunks: chunks.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Fail with `kind` once all data has been served.
    #[must_use]
    pub fn failing_with(mut self, kind: io::ErrorKind) -> Self {
        self.error = Some(kind);
        self
    }

    /// Number of times the reader was polled.
    #[must_use]
    pub fn polls(&self) -> usize { self.polls }

    /// Bytes not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize { self.data.len() - self.offset }
}

impl AsyncRead for ChunkedReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.polls += 1;
        if self.remaining() == 0 {
            return Poll::Ready(match self.error {
                Some(kind) => Err(io::Error::new(kind, "scripted read failure")),
                None => Ok(()),
            });
        }
        let scripted = self.chunks.pop_front().unwrap_or(usize::MAX);
        let n = scripted.min(buf.remaining()).min(self.remaining());
        let start = self.offset;
        buf.put_slice(&self.data[start..start + n]);
        self.offset += n;
        Poll::Ready(Ok(()))
    }
}
