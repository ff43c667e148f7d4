//! Per-writer settings for outbound WebSocket frames.

use super::header::frame_info_length;
use crate::error::{Result, WireError};

/// Default upper bound on a fragment, header included (8 KiB).
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 8 * 1024;

/// Smallest accepted maximum frame length.
///
/// Leaves room for a 2-byte header and a non-trivial payload.
pub const MIN_FRAME_LENGTH: usize = 16;

/// Largest accepted maximum frame length (16 MiB).
pub const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

/// Settings for a [`WebSocketWriter`](super::WebSocketWriter).
///
/// Only the unsized-message path consults these; every other send produces
/// exactly one frame regardless of size.
///
/// # Examples
///
/// ```
/// use wirewriter::websocket::WebSocketWriterConfig;
///
/// let config = WebSocketWriterConfig::default()
///     .with_max_frame_length(4096)
///     .expect("valid frame length");
/// assert_eq!(config.max_payload_per_frame(), 4092);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WebSocketWriterConfig {
    max_frame_length: usize,
}

impl WebSocketWriterConfig {
    /// Build a configuration with the given maximum frame length.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidFrameLength`] if `max_frame_length` lies
    /// outside [`MIN_FRAME_LENGTH`]`..=`[`MAX_FRAME_LENGTH`].
    pub fn try_new(max_frame_length: usize) -> Result<Self> {
        if !(MIN_FRAME_LENGTH..=MAX_FRAME_LENGTH).contains(&max_frame_length) {
            return Err(WireError::InvalidFrameLength {
                requested: max_frame_length,
                min: MIN_FRAME_LENGTH,
                max: MAX_FRAME_LENGTH,
            });
        }
        Ok(Self { max_frame_length })
    }

    /// Replace the maximum frame length.
    ///
    /// # Errors
    ///
    /// See [`try_new`](Self::try_new).
    pub fn with_max_frame_length(self, max_frame_length: usize) -> Result<Self> {
        Self::try_new(max_frame_length)
    }

    /// Maximum bytes per fragment, header included.
    #[must_use]
    pub const fn max_frame_length(&self) -> usize { self.max_frame_length }

    /// Header length of a maximum-size frame.
    #[must_use]
    pub const fn max_frame_info_length(&self) -> usize {
        frame_info_length(self.max_frame_length as u64)
    }

    /// Payload bytes read from the body per fragment.
    #[must_use]
    pub const fn max_payload_per_frame(&self) -> usize {
        self.max_frame_length - self.max_frame_info_length()
    }
}

impl Default for WebSocketWriterConfig {
    fn default() -> Self {
        Self {
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn default_matches_eight_kib() {
        let config = WebSocketWriterConfig::default();
        assert_eq!(config.max_frame_length(), 8192);
        assert_eq!(config.max_frame_info_length(), 4);
        assert_eq!(config.max_payload_per_frame(), 8188);
    }

    #[rstest]
    #[case(0)]
    #[case(MIN_FRAME_LENGTH - 1)]
    #[case(MAX_FRAME_LENGTH + 1)]
    fn rejects_out_of_range_lengths(#[case] requested: usize) {
        let err = WebSocketWriterConfig::try_new(requested).expect_err("length should be rejected");
        assert!(matches!(
            err,
            WireError::InvalidFrameLength { requested: r, .. } if r == requested
        ));
    }

    #[rstest]
    #[case(MIN_FRAME_LENGTH, 2)]
    #[case(200, 4)]
    #[case(70_000, 10)]
    fn header_length_tracks_frame_length(#[case] length: usize, #[case] header: usize) {
        let config = WebSocketWriterConfig::try_new(length).expect("valid length");
        assert_eq!(config.max_frame_info_length(), header);
        assert_eq!(config.max_payload_per_frame(), length - header);
    }
}
