//! Exclusive checkout of a sink shared between tasks.
//!
//! Frames from two concurrent sends would interleave mid-frame, so a
//! connection's sink must have exactly one active sender. [`SharedSink`]
//! makes that rule explicit: a sender must hold a [`SinkGuard`] to write, and
//! only one guard exists at a time.

use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

use super::OutputSink;
use crate::error::{Result, WireError};

/// Handle to a sink that several tasks take turns owning.
#[derive(Debug)]
pub struct SharedSink<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: OutputSink> SharedSink<S> {
    /// Share `sink` between the handles cloned from the returned value.
    pub fn new(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Wait until no other sender holds the sink, then take it.
    pub async fn checkout(&self) -> SinkGuard<S> {
        SinkGuard {
            guard: Arc::clone(&self.inner).lock_owned().await,
        }
    }

    /// Take the sink if it is free.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::SinkBusy`] if another guard is alive.
    pub fn try_checkout(&self) -> Result<SinkGuard<S>> {
        Arc::clone(&self.inner)
            .try_lock_owned()
            .map(|guard| SinkGuard { guard })
            .map_err(|_| WireError::SinkBusy)
    }
}

/// Exclusive right to write to a [`SharedSink`]; released on drop.
#[derive(Debug)]
pub struct SinkGuard<S> {
    guard: OwnedMutexGuard<S>,
}

impl<S> Deref for SinkGuard<S> {
    type Target = S;

    fn deref(&self) -> &Self::Target { &self.guard }
}

impl<S> DerefMut for SinkGuard<S> {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.guard }
}

#[async_trait]
impl<S: OutputSink> OutputSink for SinkGuard<S> {
    fn reserve(&mut self, min_bytes: usize) -> &mut [u8] { self.guard.reserve(min_bytes) }

    fn commit(&mut self, n_bytes: usize) { self.guard.commit(n_bytes) }

    async fn flush(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.guard.flush(cancel).await
    }
}
