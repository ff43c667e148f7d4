#![doc(html_root_url = "https://docs.rs/wirewriter/latest")]
//! Public API for the `wirewriter` library.
//!
//! This crate turns HTTP responses and WebSocket messages into byte-exact
//! wire frames on a flow-controlled [`OutputSink`]. It provides:
//!
//! - [`HttpWriter`] for HTTP/1.1 status lines, headers and bodies.
//! - [`WebSocketWriter`] for RFC 6455 frames, including fragmented messages with interleaved
//!   control frames.
//! - [`SizedReader`] for enforcing a declared content length over any reader.
//!
//! The crate never accepts connections or parses requests; callers own the
//! transport and hand each connection's sink to the appropriate writer.

pub mod error;
pub mod http;
pub mod metrics;
pub mod prelude;
pub mod sink;
pub mod sized;
pub mod websocket;

pub use error::{Result, WireError};
pub use http::{HeaderField, HttpWriter, StatusLine};
pub use sink::{BufferedSink, OutputSink, SharedSink, SinkGuard};
pub use sized::SizedReader;
pub use websocket::{Interleave, Interleaver, Opcode, WebSocketWriter, WebSocketWriterConfig};
