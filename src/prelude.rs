//! Optional convenience imports for common response-writing workflows.
//!
//! Prefer importing specialised APIs directly from their owning modules.
//!
//! # Examples
//!
//! ```rust,no_run
//! use wirewriter::prelude::*;
//!
//! fn writer(sink: BufferedSink<Vec<u8>>) -> WebSocketWriter<BufferedSink<Vec<u8>>> {
//!     WebSocketWriter::new(sink)
//! }
//! ```

pub use crate::{
    error::{Result, WireError},
    http::{HeaderField, HttpWriter, StatusLine},
    sink::{BufferedSink, OutputSink, SharedSink},
    sized::SizedReader,
    websocket::{Interleave, Interleaver, Opcode, WebSocketWriter},
};
