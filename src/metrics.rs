//! Metric helpers for `wirewriter`.
//!
//! Thin wrappers around the [`metrics`](https://docs.rs/metrics) crate. With
//! the `metrics` feature disabled every helper compiles to a no-op.

use crate::websocket::Opcode;

/// Name of the counter tracking WebSocket frames committed to a sink.
pub const FRAMES_WRITTEN: &str = "wirewriter_frames_written_total";
/// Name of the counter tracking HTTP responses sent.
pub const HTTP_RESPONSES: &str = "wirewriter_http_responses_total";
/// Name of the counter tracking failed sink flushes.
pub const FLUSH_ERRORS: &str = "wirewriter_flush_errors_total";

/// Record a frame written with the given opcode.
pub fn inc_frames(opcode: Opcode) {
    #[cfg(feature = "metrics")]
    metrics::counter!(FRAMES_WRITTEN, "opcode" => opcode.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = opcode;
}

/// Record a completed HTTP response.
pub fn inc_http_responses() {
    #[cfg(feature = "metrics")]
    metrics::counter!(HTTP_RESPONSES).increment(1);
}

/// Record a flush that failed with a transport error.
pub fn inc_flush_errors() {
    #[cfg(feature = "metrics")]
    metrics::counter!(FLUSH_ERRORS).increment(1);
}
