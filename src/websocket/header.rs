//! RFC 6455 frame header encoding.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
//! |N|V|V|V|       |S|             |   (if payload len==126/127)   |
//! +-+-+-+-+-------+-+-------------+ - - - - - - - - - - - - - - - +
//! ```
//!
//! Server frames are never masked, so the mask bit is always clear and no
//! masking key follows the length.

use super::Opcode;

/// FIN bit of the first header byte.
pub const FIN_BIT: u8 = 0b1000_0000;

/// Largest payload length a header can carry (the 64-bit field's MSB is 0).
pub const MAX_PAYLOAD_LENGTH: u64 = i64::MAX as u64;

/// Longest possible frame header.
pub const MAX_FRAME_INFO_LENGTH: usize = 10;

const MAX_INLINE_LENGTH: u64 = 125;
const EXTENDED_16: u8 = 126;
const EXTENDED_64: u8 = 127;

/// Header length needed for a frame carrying `payload_length` bytes.
///
/// | payload length | header |
/// |----------------|--------|
/// | 0..=125        | 2      |
/// | 126..=65535    | 4      |
/// | above 65535    | 10     |
#[must_use]
pub const fn frame_info_length(payload_length: u64) -> usize {
    if payload_length <= MAX_INLINE_LENGTH {
        2
    } else if payload_length <= u16::MAX as u64 {
        4
    } else {
        MAX_FRAME_INFO_LENGTH
    }
}

/// Write a frame header into the front of `dst`, returning its length.
///
/// # Panics
///
/// Panics if `dst` is shorter than [`frame_info_length`] of
/// `payload_length`.
#[expect(
    clippy::big_endian_bytes,
    reason = "Network byte order requires big-endian bytes."
)]
#[expect(
    clippy::cast_possible_truncation,
    reason = "Each arm only runs for lengths that fit its field."
)]
pub fn write_frame_info(fin: bool, opcode: Opcode, payload_length: u64, dst: &mut [u8]) -> usize {
    let header_length = frame_info_length(payload_length);
    let dst = &mut dst[..header_length];
    dst[0] = if fin { FIN_BIT | opcode.as_u8() } else { opcode.as_u8() };

    match header_length {
        2 => dst[1] = payload_length as u8,
        4 => {
            dst[1] = EXTENDED_16;
            dst[2..4].copy_from_slice(&(payload_length as u16).to_be_bytes());
        }
        _ => {
            dst[1] = EXTENDED_64;
            dst[2..10].copy_from_slice(&payload_length.to_be_bytes());
        }
    }
    header_length
}

/// A decoded frame header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInfo {
    /// Whether this frame ends its message.
    pub fin: bool,
    /// Frame opcode.
    pub opcode: Opcode,
    /// Payload length carried by the header.
    pub payload_length: u64,
    /// Bytes occupied by the header itself.
    pub header_length: usize,
}

/// Decode an unmasked frame header from the front of `bytes`.
///
/// Returns `None` if `bytes` is truncated, the opcode is unknown, or the
/// frame is masked.
#[must_use]
#[expect(
    clippy::big_endian_bytes,
    reason = "Network byte order requires big-endian bytes."
)]
pub fn decode_frame_info(bytes: &[u8]) -> Option<FrameInfo> {
    let (&first, rest) = bytes.split_first()?;
    let (&second, rest) = rest.split_first()?;
    if second & 0x80 != 0 {
        return None;
    }
    let opcode = Opcode::from_u8(first & 0x0F)?;

    let (payload_length, header_length) = match second {
        EXTENDED_16 => (u64::from(u16::from_be_bytes(rest.get(..2)?.try_into().ok()?)), 4),
        EXTENDED_64 => (u64::from_be_bytes(rest.get(..8)?.try_into().ok()?), 10),
        inline => (u64::from(inline), 2),
    };

    Some(FrameInfo {
        fin: first & FIN_BIT != 0,
        opcode,
        payload_length,
        header_length,
    })
}
