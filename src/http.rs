//! HTTP/1.1 response envelope writer.
//!
//! [`HttpWriter`] frames a response onto an [`OutputSink`] in wire order:
//! status line, header lines, a blank line, then the body. Lines are
//! committed to the sink as they are written; only [`HttpWriter::send`]
//! flushes.
//!
//! The writer is a raw framer. Names, values and reason phrases are written
//! verbatim and nothing checks that a declared `Content-Length` matches the
//! body.

use std::{borrow::Cow, io::Write as _};

use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use crate::{
    error::Result,
    metrics,
    sink::{OutputSink, copy_to_sink},
};

const HTTP_VERSION: &[u8] = b"HTTP/1.1 ";
const CRLF: &[u8] = b"\r\n";
const HEADER_SEPARATOR: &[u8] = b": ";
/// Longest decimal rendering of a `u16`.
const MAX_CODE_DIGITS: usize = 5;

/// Status code and reason phrase of a response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    /// Numeric status, typically 100 to 599.
    pub code: u16,
    /// Reason phrase, written verbatim.
    pub reason: Cow<'static, str>,
}

impl StatusLine {
    /// Build a status line.
    pub fn new(code: u16, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// A single response header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderField {
    /// Header name, written verbatim.
    pub name: Cow<'static, str>,
    /// Header value, written verbatim.
    pub value: Cow<'static, str>,
}

impl HeaderField {
    /// Build a header field.
    pub fn new(name: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Writes HTTP/1.1 responses to an [`OutputSink`].
///
/// # Examples
///
/// ```
/// use tokio_util::sync::CancellationToken;
/// use wirewriter::{http::HttpWriter, sink::BufferedSink};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> wirewriter::Result<()> {
/// let mut writer = HttpWriter::new(BufferedSink::new(Vec::new()));
/// writer.write_status_line(204, "No Content");
/// writer.send(&b""[..], &CancellationToken::new()).await?;
/// assert_eq!(writer.get_ref().get_ref(), b"HTTP/1.1 204 No Content\r\n\r\n");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpWriter<S> {
    sink: S,
}

impl<S> HttpWriter<S> {
    /// Wrap `sink`.
    pub fn new(sink: S) -> Self { Self { sink } }

    /// Borrow the sink.
    pub fn get_ref(&self) -> &S { &self.sink }

    /// Mutably borrow the sink.
    pub fn sink_mut(&mut self) -> &mut S { &mut self.sink }

    /// Consume the writer, returning the sink.
    pub fn into_inner(self) -> S { self.sink }
}

impl<S: OutputSink> HttpWriter<S> {
    /// Write `HTTP/1.1 {code} {reason}\r\n`.
    pub fn write_status_line(&mut self, code: u16, reason: &str) {
        let capacity = HTTP_VERSION.len() + MAX_CODE_DIGITS + 1 + reason.len() + CRLF.len();
        let region = self.sink.reserve(capacity);
        let mut cursor = &mut region[..capacity];
        // The reservation covers the longest possible line.
        let written = write!(cursor, "HTTP/1.1 {code} {reason}\r\n").map(|()| capacity - cursor.len());
        debug_assert!(written.is_ok(), "status line exceeded its reservation");
        self.sink.commit(written.unwrap_or(0));
    }

    /// Write a [`StatusLine`].
    pub fn write_status(&mut self, status: &StatusLine) {
        self.write_status_line(status.code, &status.reason);
    }

    /// Write `{name}: {value}\r\n`.
    pub fn write_header(&mut self, name: &str, value: &str) {
        let parts = [
            name.as_bytes(),
            HEADER_SEPARATOR,
            value.as_bytes(),
            CRLF,
        ];
        let total = parts.iter().map(|part| part.len()).sum();
        let region = self.sink.reserve(total);
        let mut offset = 0;
        for part in parts {
            region[offset..offset + part.len()].copy_from_slice(part);
            offset += part.len();
        }
        self.sink.commit(total);
    }

    /// Write a [`HeaderField`].
    pub fn write_header_field(&mut self, header: &HeaderField) {
        self.write_header(&header.name, &header.value);
    }

    /// End the header block, copy `body` and flush the response.
    ///
    /// The mutable borrow lasts until the body is flushed, so no header can
    /// be written once sending starts. Afterwards the writer is ready for the
    /// next response on the same sink.
    ///
    /// # Errors
    ///
    /// Returns body read errors, flush errors and
    /// [`WireError::Cancelled`](crate::WireError::Cancelled) unchanged.
    pub async fn send<R>(&mut self, mut body: R, cancel: &CancellationToken) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let region = self.sink.reserve(CRLF.len());
        region[..CRLF.len()].copy_from_slice(CRLF);
        self.sink.commit(CRLF.len());

        let body_length = copy_to_sink(&mut body, &mut self.sink, cancel).await?;
        self.sink.flush(cancel).await?;
        tracing::debug!(body_length, "http response sent");
        metrics::inc_http_responses();
        Ok(())
    }
}
