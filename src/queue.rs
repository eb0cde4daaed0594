//! Bounded-concurrency task queue for image service calls.
//!
//! Every identify and resize call runs on one dedicated rayon pool whose
//! thread count is the concurrency cap. Because the folder walk itself also
//! runs inside that pool (see [`TaskQueue::install`]), the cap holds across
//! the whole run, not per folder: no more than `concurrency` service calls
//! are ever in flight.
//!
//! ## Two kinds of task
//!
//! - **identify** is synchronous for the caller: the calling folder needs the
//!   result before it can finish. Called from a pool thread it runs inline on
//!   that thread; called from outside it is shipped into the pool.
//! - **resize** is fire-and-forget: it is queued FIFO on the pool and its
//!   outcome is sent over a channel. [`TaskQueue::finish`] drops the queue's
//!   sender and drains the channel, so it returns only after every queued
//!   resize has ended.
//!
//! A failing task only produces an `Err` for that task; the pool and the
//! other tasks carry on.

use crate::imaging::{Identified, ImageService, ResizeParams, ServiceError};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Default concurrency cap, matching what an image toolkit comfortably runs in parallel.
pub const DEFAULT_CONCURRENCY: usize = 5;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Result of one resize task.
#[derive(Debug)]
pub struct ResizeOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    pub size: u32,
    pub result: Result<(), ServiceError>,
}

pub struct TaskQueue<S> {
    pool: rayon::ThreadPool,
    service: Arc<S>,
    sender: Sender<ResizeOutcome>,
    receiver: Mutex<Receiver<ResizeOutcome>>,
}

impl<S: ImageService + 'static> TaskQueue<S> {
    /// Start a queue running at most `concurrency` tasks at once (minimum 1).
    pub fn new(service: Arc<S>, concurrency: usize) -> Result<Self, QueueError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency.max(1))
            .thread_name(|i| format!("gallery-worker-{i}"))
            .panic_handler(|_| tracing::error!("image task panicked"))
            .build()?;
        let (sender, receiver) = mpsc::channel();
        Ok(Self {
            pool,
            service,
            sender,
            receiver: Mutex::new(receiver),
        })
    }

    pub fn concurrency(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` on the pool, so parallel iterators inside it share the cap.
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }

    /// Identify one image, waiting for the result.
    pub fn identify(&self, path: &Path) -> Result<Identified, ServiceError> {
        self.pool.install(|| self.service.identify(path))
    }

    /// Queue one resize. Its outcome is reported by [`finish`](Self::finish).
    pub fn resize(&self, params: ResizeParams) {
        let service = Arc::clone(&self.service);
        let sender = self.sender.clone();
        self.pool.spawn_fifo(move || {
            let result = service.resize(&params);
            tracing::debug!(output = %params.output.display(), ok = result.is_ok(), "resize finished");
            // The receiver only goes away with the queue itself.
            let _ = sender.send(ResizeOutcome {
                source: params.source,
                output: params.output,
                size: params.size,
                result,
            });
        });
    }

    /// Wait for every queued resize and return their outcomes in completion order.
    pub fn finish(self) -> Vec<ResizeOutcome> {
        let Self {
            pool,
            sender,
            receiver,
            ..
        } = self;
        drop(sender);
        let outcomes = receiver
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .collect();
        drop(pool);
        outcomes
    }
}
