//! FIFO of progress events shared between a job and the relay.

use crate::types::ProgressEvent;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

/// Unbounded, thread-safe FIFO of progress events
///
/// Neither side ever blocks: the job pushes without waiting and the relay
/// pops without waiting, getting `None` when nothing is queued.
pub struct EventQueue {
    tx: mpsc::UnboundedSender<ProgressEvent>,
    rx: Mutex<mpsc::UnboundedReceiver<ProgressEvent>>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Append an event
    pub fn push(&self, event: ProgressEvent) {
        // The receiver lives as long as `self`, so this cannot fail
        let _ = self.tx.send(event);
    }

    /// Remove and return the oldest event, or `None` if the queue is empty
    pub fn try_pop(&self) -> Option<ProgressEvent> {
        self.rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_recv()
            .ok()
    }

    /// Remove every queued event, oldest first
    pub fn drain(&self) -> Vec<ProgressEvent> {
        std::iter::from_fn(|| self.try_pop()).collect()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue").finish_non_exhaustive()
    }
}
