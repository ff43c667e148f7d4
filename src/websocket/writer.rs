//! Outbound WebSocket message writer.

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use super::{
    Opcode,
    config::WebSocketWriterConfig,
    header::{MAX_PAYLOAD_LENGTH, frame_info_length, write_frame_info},
};
use crate::{
    error::{Result, WireError},
    metrics,
    sink::{OutputSink, copy_to_sink, read_cancellable},
    sized::SizedReader,
};

/// Verdict returned by an [`Interleaver`] between fragments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interleave {
    /// Carry on sending the message.
    Continue,
    /// Abandon the message without sending its final frame.
    Stop,
}

/// Hook run between the fragments of an unsized message.
///
/// The hook receives the writer that still owns the sink, so it can emit
/// other frames (typically pings or pongs) without a second sender touching
/// the connection. Every frame it writes lands between two complete
/// fragments.
#[async_trait]
pub trait Interleaver<S: OutputSink>: Send {
    /// Called after each non-final fragment has been flushed.
    ///
    /// # Errors
    ///
    /// Any error aborts the message and is returned to the sender.
    async fn between_fragments(
        &mut self,
        writer: &mut WebSocketWriter<S>,
        cancel: &CancellationToken,
    ) -> Result<Interleave>;
}

/// Interleaver that never intervenes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInterleaver;

#[async_trait]
impl<S: OutputSink> Interleaver<S> for NoInterleaver {
    async fn between_fragments(
        &mut self,
        _writer: &mut WebSocketWriter<S>,
        _cancel: &CancellationToken,
    ) -> Result<Interleave> {
        Ok(Interleave::Continue)
    }
}

/// Encodes unmasked WebSocket frames onto an [`OutputSink`].
///
/// Each send method takes `&mut self`, so a writer has at most one message
/// in flight. Share a connection between tasks through
/// [`SharedSink`](crate::sink::SharedSink) rather than by cloning sinks.
///
/// # Examples
///
/// ```
/// use tokio_util::sync::CancellationToken;
/// use wirewriter::{
///     sink::BufferedSink,
///     websocket::{Opcode, WebSocketWriter},
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> wirewriter::Result<()> {
/// let mut writer = WebSocketWriter::new(BufferedSink::new(Vec::new()));
/// writer
///     .write_memory_message(Opcode::Text, b"hi", &CancellationToken::new())
///     .await?;
/// assert_eq!(writer.get_ref().get_ref(), &[0x81, 0x02, b'h', b'i']);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WebSocketWriter<S> {
    sink: S,
    config: WebSocketWriterConfig,
}

impl<S> WebSocketWriter<S> {
    /// Wrap `sink` with the default configuration.
    pub fn new(sink: S) -> Self { Self::with_config(sink, WebSocketWriterConfig::default()) }

    /// Wrap `sink` with an explicit configuration.
    pub fn with_config(sink: S, config: WebSocketWriterConfig) -> Self { Self { sink, config } }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> WebSocketWriterConfig { self.config }

    /// Change the fragment size used by unsized messages.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidFrameLength`] and leaves the writer
    /// unchanged if the length is out of range.
    pub fn set_max_frame_length(&mut self, max_frame_length: usize) -> Result<()> {
        self.config = self.config.with_max_frame_length(max_frame_length)?;
        Ok(())
    }

    /// Header length of a maximum-size frame.
    #[must_use]
    pub fn max_frame_info_length(&self) -> usize { self.config.max_frame_info_length() }

    /// Borrow the sink.
    pub fn get_ref(&self) -> &S { &self.sink }

    /// Mutably borrow the sink.
    pub fn sink_mut(&mut self) -> &mut S { &mut self.sink }

    /// Consume the writer, returning the sink.
    pub fn into_inner(self) -> S { self.sink }
}

impl<S: OutputSink> WebSocketWriter<S> {
    /// Send a message whose payload length is known up front.
    ///
    /// Writes one `fin` frame: the header is committed first, then the body
    /// is copied straight into the sink and flushed once. At most `length`
    /// bytes are taken from `body`.
    ///
    /// # Errors
    ///
    /// - [`WireError::InvalidLength`] before anything is reserved if `length` exceeds
    ///   [`MAX_PAYLOAD_LENGTH`].
    /// - [`WireError::BodyTooShort`] if `body` ends early. The partial frame stays committed but
    ///   unflushed and the connection cannot be reused.
    /// - Read, flush and cancellation errors as they occur.
    pub async fn write_sized_message<R>(
        &mut self,
        opcode: Opcode,
        body: R,
        length: u64,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        if length > MAX_PAYLOAD_LENGTH {
            return Err(WireError::InvalidLength { length });
        }

        let header = frame_info_length(length);
        let region = self.sink.reserve(header);
        write_frame_info(true, opcode, length, region);
        self.sink.commit(header);

        let mut body = SizedReader::new(body, length);
        let copied = copy_to_sink(&mut body, &mut self.sink, cancel).await?;
        if copied < length {
            return Err(WireError::BodyTooShort {
                expected: length,
                actual: copied,
            });
        }
        record_frame(true, opcode, length);
        self.sink.flush(cancel).await
    }

    /// Send a message of unknown length as a series of fragments.
    ///
    /// Equivalent to [`write_unsized_message_with`] using [`NoInterleaver`].
    ///
    /// # Errors
    ///
    /// See [`write_unsized_message_with`].
    ///
    /// [`write_unsized_message_with`]: Self::write_unsized_message_with
    pub async fn write_unsized_message<R>(
        &mut self,
        opcode: Opcode,
        body: R,
        cancel: &CancellationToken,
    ) -> Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        self.write_unsized_message_with(opcode, body, &mut NoInterleaver, cancel)
            .await
    }

    /// Send a message of unknown length, running `interleaver` between
    /// fragments.
    ///
    /// Each fragment is at most [`max_frame_length`] bytes, header included,
    /// and is flushed on its own. The first fragment carries `opcode`, later
    /// ones [`Opcode::Continuation`]. Once `body` reports end of stream an
    /// empty `fin` frame closes the message. If `interleaver` answers
    /// [`Interleave::Stop`] the call returns without that closing frame.
    ///
    /// Returns the number of frames written.
    ///
    /// # Errors
    ///
    /// Read, flush, interleaver and cancellation errors abort the message.
    /// Fragments flushed before the failure stay on the wire and the message
    /// is left unterminated.
    ///
    /// [`max_frame_length`]: WebSocketWriterConfig::max_frame_length
    pub async fn write_unsized_message_with<R, I>(
        &mut self,
        mut opcode: Opcode,
        mut body: R,
        interleaver: &mut I,
        cancel: &CancellationToken,
    ) -> Result<usize>
    where
        R: AsyncRead + Unpin,
        I: Interleaver<S> + ?Sized,
    {
        let max_frame = self.config.max_frame_length();
        let max_header = self.config.max_frame_info_length();
        let mut frames = 0usize;

        loop {
            let region = self.sink.reserve(max_frame);
            let read =
                read_cancellable(&mut body, &mut region[max_header..max_frame], cancel).await?;

            if read == 0 {
                let header = write_frame_info(true, opcode, 0, region);
                self.sink.commit(header);
                record_frame(true, opcode, 0);
                self.sink.flush(cancel).await?;
                frames += 1;
                tracing::debug!(frames, "unsized message complete");
                return Ok(frames);
            }

            let payload = read as u64;
            let header = frame_info_length(payload);
            if header != max_header {
                region.copy_within(max_header..max_header + read, header);
            }
            write_frame_info(false, opcode, payload, region);
            self.sink.commit(header + read);
            record_frame(false, opcode, payload);
            self.sink.flush(cancel).await?;
            frames += 1;
            opcode = Opcode::Continuation;

            if interleaver.between_fragments(self, cancel).await? == Interleave::Stop {
                tracing::debug!(frames, "interleaver stopped unsized message");
                return Ok(frames);
            }
        }
    }

    /// Send a fully resident payload as a single `fin` frame.
    ///
    /// Header and payload are committed together from one reservation and
    /// flushed once; no fragmentation happens regardless of size.
    ///
    /// # Errors
    ///
    /// Flush and cancellation errors.
    pub async fn write_memory_message(
        &mut self,
        opcode: Opcode,
        payload: &[u8],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let length = payload.len() as u64;
        if length > MAX_PAYLOAD_LENGTH {
            return Err(WireError::InvalidLength { length });
        }
        let header = frame_info_length(length);
        let total = header + payload.len();

        let region = self.sink.reserve(total);
        write_frame_info(true, opcode, length, region);
        region[header..total].copy_from_slice(payload);
        self.sink.commit(total);
        record_frame(true, opcode, length);
        self.sink.flush(cancel).await
    }

    /// Send a close frame.
    ///
    /// The payload is empty without a `code`, the big-endian code alone
    /// without a `reason`, or the code followed by the UTF-8 reason. A
    /// `reason` without a `code` is not sent.
    ///
    /// # Errors
    ///
    /// Flush and cancellation errors.
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    pub async fn write_close_message(
        &mut self,
        code: Option<u16>,
        reason: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let reason = code.and(reason).unwrap_or_default().as_bytes();
        let body_length = if code.is_some() { 2 + reason.len() } else { 0 };
        if body_length > 125 {
            tracing::warn!(
                body_length,
                "close payload exceeds the 125 byte control frame limit"
            );
        }
        let length = body_length as u64;
        let header = frame_info_length(length);
        let total = header + body_length;

        let region = self.sink.reserve(total);
        write_frame_info(true, Opcode::Close, length, region);
        if let Some(code) = code {
            region[header..header + 2].copy_from_slice(&code.to_be_bytes());
            region[header + 2..total].copy_from_slice(reason);
        }
        self.sink.commit(total);
        record_frame(true, Opcode::Close, length);
        self.sink.flush(cancel).await
    }
}

fn record_frame(fin: bool, opcode: Opcode, payload_length: u64) {
    tracing::trace!(%opcode, fin, payload_length, "frame written");
    metrics::inc_frames(opcode);
}
