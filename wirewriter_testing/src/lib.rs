//! Test doubles for driving `wirewriter` writers in memory.
//!
//! [`RecordingSink`] captures every flushed batch so tests can assert on
//! frame boundaries, [`ChunkedReader`] scripts how a body source hands out
//! bytes, and [`decode_frames`] splits captured bytes back into WebSocket
//! frames.
//!
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use wirewriter::websocket::{Opcode, WebSocketWriter};
//! use wirewriter_testing::{RecordingSink, decode_frames};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut writer = WebSocketWriter::new(RecordingSink::new());
//! writer
//!     .write_memory_message(Opcode::Text, b"hi", &CancellationToken::new())
//!     .await
//!     .expect("send");
//! let frames = decode_frames(&writer.get_ref().wire()).expect("frames");
//! assert_eq!(frames[0].payload, b"hi");
//! # }
//! ```

pub mod frames;
pub mod macros;
pub mod reader;
pub mod sink;

pub use frames::{DecodedFrame, decode_frames};
pub use reader::ChunkedReader;
pub use sink::{FlushBehaviour, RecordingSink, recording_sink};
