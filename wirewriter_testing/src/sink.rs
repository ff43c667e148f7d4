//! Recording implementation of [`OutputSink`].

use std::io;

use async_trait::async_trait;
use rstest::fixture;
use tokio_util::sync::CancellationToken;
use wirewriter::{OutputSink, Result, WireError};

/// How [`RecordingSink::flush`] behaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlushBehaviour {
    /// Every flush succeeds.
    #[default]
    Accept,
    /// Flushes succeed `n` times, then fail with a broken pipe.
    FailAfter(usize),
    /// Flushes never complete until cancelled.
    Stall,
}

/// Sink that keeps every flushed batch for inspection.
///
/// Each successful flush moves pending bytes into a new batch, so a batch
/// corresponds to one writer flush. Failed or cancelled flushes leave the
/// pending bytes untouched.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pending: Vec<u8>,
    reserved: Option<usize>,
    batches: Vec<Vec<u8>>,
    behaviour: FlushBehaviour,
    flush_attempts: usize,
    largest_reservation: usize,
}

impl RecordingSink {
    /// A sink whose flushes always succeed.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// A sink with the given flush behaviour.
    #[must_use]
    pub fn with_behaviour(behaviour: FlushBehaviour) -> Self {
        Self {
            behaviour,
            ..Self::default()
        }
    }

    /// Batches written by successful flushes, in order.
    #[must_use]
    pub fn batches(&self) -> &[Vec<u8>] { &self.batches }

    /// All flushed bytes concatenated.
    #[must_use]
    pub fn wire(&self) -> Vec<u8> { self.batches.concat() }

    /// Committed bytes awaiting a flush.
    #[must_use]
    pub fn pending(&self) -> &[u8] { &self.pending[..self.committed_len()] }

    /// Number of flush calls, successful or not.
    #[must_use]
    pub fn flush_attempts(&self) -> usize { self.flush_attempts }

    /// Largest region requested through `reserve`.
    #[must_use]
    pub fn largest_reservation(&self) -> usize { self.largest_reservation }

    fn committed_len(&self) -> usize { self.pending.len() - self.reserved.unwrap_or(0) }
}

#[async_trait]
impl OutputSink for RecordingSink {
    fn reserve(&mut self, min_bytes: usize) -> &mut [u8] {
        let committed = self.committed_len();
        self.pending.truncate(committed);
        // Poison the region so tests catch bytes committed without being written.
        self.pending.resize(committed + min_bytes, 0xEE);
        self.reserved = Some(min_bytes);
        self.largest_reservation = self.largest_reservation.max(min_bytes);
        &mut self.pending[committed..]
    }

    fn commit(&mut self, n_bytes: usize) {
        let reserved = self
            .reserved
            .take()
            .unwrap_or_else(|| panic!("commit of {n_bytes} bytes without a reservation"));
        assert!(
            n_bytes <= reserved,
            "commit of {n_bytes} bytes exceeds reservation of {reserved}"
        );
        let committed = self.pending.len() - reserved;
        self.pending.truncate(committed + n_bytes);
    }

    async fn flush(&mut self, cancel: &CancellationToken) -> Result<()> {
        let committed = self.committed_len();
        self.pending.truncate(committed);
        self.reserved = None;
        self.flush_attempts += 1;

        match self.behaviour {
            FlushBehaviour::Stall => {
                cancel.cancelled().await;
                return Err(WireError::Cancelled);
            }
            FlushBehaviour::FailAfter(successes) if self.batches.len() >= successes => {
                return Err(WireError::Io(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "scripted flush failure",
                )));
            }
            _ => {}
        }
        if cancel.is_cancelled() {
            return Err(WireError::Cancelled);
        }
        if !self.pending.is_empty() {
            self.batches.push(std::mem::take(&mut self.pending));
        }
        Ok(())
    }
}

/// Fixture providing an accepting [`RecordingSink`].
#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn recording_sink() -> RecordingSink { RecordingSink::new() }
