//! Coordination context plumbing.
//!
//! Threading model:
//! - worker pool (`rayon::ThreadPool`): fetches and probes, never touches gallery state
//! - [`Poster::post`]: hands a worker's result back to the coordination thread
//! - [`MainQueue`]: drained by the coordination thread, which owns all gallery,
//!   collection and slot state

use crate::error::FetchError;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Builds the shared worker pool.
pub fn worker_pool(threads: usize) -> Result<Arc<rayon::ThreadPool>, FetchError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("gallery-fetch-{}", i))
        .build()
        .map(Arc::new)
        .map_err(|e| FetchError::Worker(e.to_string()))
}

/// Sending half handed to workers.
pub struct Poster<T> {
    tx: Sender<T>,
}

impl<T> Clone for Poster<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T: Send> Poster<T> {
    /// Queues `message` for the coordination thread. Returns `false` once the queue is gone.
    pub fn post(&self, message: T) -> bool {
        self.tx.send(message).is_ok()
    }
}

/// Results waiting to be applied on the coordination thread, in arrival order.
pub struct MainQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T: Send> MainQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn poster(&self) -> Poster<T> {
        Poster { tx: self.tx.clone() }
    }

    /// Everything posted so far, without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }

    /// Waits up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl<T: Send> Default for MainQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
