//! Canonical error and result types for the crate.
//!
//! Every write and send operation surfaces failures through [`WireError`].
//! The variants separate caller mistakes (rejected before any bytes are
//! reserved), unsupported stream operations, transport failures and
//! cooperative cancellation, so callers can tell "aborted by us" apart from
//! "the transport broke".

use std::io;

use thiserror::Error;

/// Top-level error type exposed by `wirewriter`.
#[derive(Debug, Error)]
pub enum WireError {
    /// A payload length that cannot be represented on the wire.
    ///
    /// RFC 6455 requires the most significant bit of the 64-bit length to be
    /// zero, so lengths above `i64::MAX` are rejected.
    #[error("payload length {length} cannot be encoded in a frame header")]
    InvalidLength {
        /// Length supplied by the caller.
        length: u64,
    },

    /// A maximum frame length outside the supported range.
    #[error("max frame length {requested} outside supported range {min}..={max}")]
    InvalidFrameLength {
        /// Length requested by the caller.
        requested: usize,
        /// Smallest accepted value.
        min: usize,
        /// Largest accepted value.
        max: usize,
    },

    /// The operation is not meaningful for this type.
    #[error("unsupported operation: {operation}")]
    Unsupported {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// Failure reported by a body source or by the transport during flush.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    /// The operation observed its cancellation token before completing.
    #[error("operation cancelled")]
    Cancelled,

    /// A sized body ended before delivering its declared length.
    #[error("body ended after {actual} of {expected} declared bytes")]
    BodyTooShort {
        /// Declared payload length.
        expected: u64,
        /// Bytes actually produced by the body.
        actual: u64,
    },

    /// The shared sink is checked out by another sender.
    #[error("output sink is checked out by another sender")]
    SinkBusy,
}

impl WireError {
    /// Returns true if this error represents cancellation rather than failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool { matches!(self, Self::Cancelled) }

    /// Convert into an [`io::Error`] for callers that speak `std::io`.
    ///
    /// Cancellation maps to [`io::ErrorKind::Interrupted`]; transport errors
    /// are returned unchanged.
    #[must_use]
    pub fn into_io(self) -> io::Error {
        match self {
            Self::Io(error) => error,
            Self::Cancelled => io::Error::new(io::ErrorKind::Interrupted, Self::Cancelled),
            Self::Unsupported { .. } => io::Error::new(io::ErrorKind::Unsupported, self),
            Self::BodyTooShort { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, self),
            Self::SinkBusy => io::Error::new(io::ErrorKind::WouldBlock, self),
            Self::InvalidLength { .. } | Self::InvalidFrameLength { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, self)
            }
        }
    }
}

/// Canonical result alias used by `wirewriter` public APIs.
pub type Result<T> = std::result::Result<T, WireError>;
