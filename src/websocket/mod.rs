//! WebSocket (RFC 6455) frame encoding for server-originated messages.
//!
//! [`WebSocketWriter`] offers four ways to send a message, all built on the
//! header encoder in [`header`]:
//!
//! - [`write_sized_message`]: one frame, body streamed from a reader whose length is known.
//! - [`write_unsized_message`]: body of unknown length split into fragments, with an optional
//!   [`Interleaver`] between fragments.
//! - [`write_memory_message`]: one frame from an in-memory payload.
//! - [`write_close_message`]: a close frame with optional status code and reason.
//!
//! Frames are never masked; masking is a client-to-server concern.
//!
//! [`write_sized_message`]: WebSocketWriter::write_sized_message
//! [`write_unsized_message`]: WebSocketWriter::write_unsized_message
//! [`write_memory_message`]: WebSocketWriter::write_memory_message
//! [`write_close_message`]: WebSocketWriter::write_close_message

use std::fmt;

pub mod config;
pub mod header;
mod writer;

pub use config::{DEFAULT_MAX_FRAME_LENGTH, WebSocketWriterConfig};
pub use header::{FrameInfo, decode_frame_info, frame_info_length, write_frame_info};
pub use writer::{Interleave, Interleaver, NoInterleaver, WebSocketWriter};

/// WebSocket frame opcode (4 bits).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Continuation of a fragmented message.
    Continuation = 0x0,
    /// UTF-8 text data.
    Text = 0x1,
    /// Binary data.
    Binary = 0x2,
    /// Connection close.
    Close = 0x8,
    /// Ping.
    Ping = 0x9,
    /// Pong.
    Pong = 0xA,
}

impl Opcode {
    /// Wire value of the opcode.
    #[must_use]
    pub const fn as_u8(self) -> u8 { self as u8 }

    /// Parse a wire value, returning `None` for reserved opcodes.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x0 => Some(Self::Continuation),
            0x1 => Some(Self::Text),
            0x2 => Some(Self::Binary),
            0x8 => Some(Self::Close),
            0x9 => Some(Self::Ping),
            0xA => Some(Self::Pong),
            _ => None,
        }
    }

    /// Returns true for close, ping and pong.
    #[must_use]
    pub const fn is_control(self) -> bool { matches!(self, Self::Close | Self::Ping | Self::Pong) }

    /// Lower-case name, used for log fields and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Continuation => "continuation",
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Close => "close",
            Self::Ping => "ping",
            Self::Pong => "pong",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[cfg(test)]
mod tests;
