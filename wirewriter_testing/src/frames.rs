//! Decoding of captured WebSocket output.

use wirewriter::websocket::{Opcode, decode_frame_info};

/// One frame recovered from captured bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFrame {
    /// FIN bit.
    pub fin: bool,
    /// Frame opcode.
    pub opcode: Opcode,
    /// Header length on the wire.
    pub header_length: usize,
    /// Payload bytes.
    pub payload: Vec<u8>,
}

/// Split `wire` into frames.
///
/// # Errors
///
/// Returns a description of the first malformed or truncated frame.
pub fn decode_frames(wire: &[u8]) -> Result<Vec<DecodedFrame>, String> {
    let mut frames = Vec::new();
    let mut offset = 0;
    while offset < wire.len() {
        let rest = &wire[offset..];
        let info = decode_frame_info(rest)
            .ok_or_else(|| format!("malformed frame header at offset {offset}"))?;
        let length = usize::try_from(info.payload_length)
            .map_err(|_| format!("frame at offset {offset} too large"))?;
        let payload = rest
            .get(info.header_length..info.header_length + length)
            .ok_or_else(|| format!("truncated payload at offset {offset}"))?;
        frames.push(DecodedFrame {
            fin: info.fin,
            opcode: info.opcode,
            header_length: info.header_length,
            payload: payload.to_vec(),
        });
        offset += info.header_length + length;
    }
    Ok(frames)
}
