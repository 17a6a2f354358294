//! Batch coordinator
//!
//! Fans input files out to a fixed pool of worker threads over a bounded
//! queue. Each worker runs the full pipeline for one file and writes the
//! result. The run is fail-fast: the first failure cancels everything else.

mod discover;
mod exclude;

pub use discover::discover;
pub use exclude::{ExcludeError, ExcludeRules};

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError};
use serde::Serialize;
use tracing::{debug, error, info};
use yacs_core::{ProcessOptions, Processor};

use crate::signal::CancelState;
use crate::writer::{save_json, WriteError};

/// How often a blocked producer re-checks for cancellation.
const SEND_POLL: Duration = Duration::from_millis(50);

/// One input file and where its result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub index: usize,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Why a single file failed.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error(transparent)]
    Process(#[from] yacs_core::Error),

    #[error(transparent)]
    Write(#[from] WriteError),
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("cannot scan {}: {source}", path.display())]
    Discover {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("exclude rules error: {0}")]
    Exclude(#[from] ExcludeError),

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: FileError,
    },

    #[error("interrupted after {processed} of {total} files")]
    Interrupted { processed: usize, total: usize },
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub workers: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

pub struct BatchCoordinator {
    processor: Processor,
    options: ProcessOptions,
    workers: usize,
    queue_capacity: usize,
    cancel: Arc<CancelState>,
}

impl BatchCoordinator {
    pub fn new(processor: Processor, options: ProcessOptions, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            processor,
            options,
            workers,
            queue_capacity: workers,
            cancel: Arc::new(CancelState::new()),
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Share cancellation with a signal handler.
    pub fn with_cancel_state(mut self, cancel: Arc<CancelState>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_state(&self) -> Arc<CancelState> {
        Arc::clone(&self.cancel)
    }

    /// Process every item. Returns the first failure, if any.
    pub fn run(&self, items: Vec<WorkItem>) -> Result<BatchSummary, BatchError> {
        let started_at = Utc::now();
        let total = items.len();
        let processed = AtomicUsize::new(0);
        let failure: Mutex<Option<BatchError>> = Mutex::new(None);
        let (sender, receiver) = bounded::<WorkItem>(self.queue_capacity);

        info!(total, workers = self.workers, "starting batch");

        thread::scope(|scope| {
            for worker in 0..self.workers {
                let receiver = receiver.clone();
                let processed = &processed;
                let failure = &failure;
                scope.spawn(move || self.work(worker, receiver, processed, failure));
            }
            drop(receiver);

            'items: for item in items {
                let mut pending = item;
                loop {
                    if self.cancel.is_cancelled() {
                        break 'items;
                    }
                    match sender.send_timeout(pending, SEND_POLL) {
                        Ok(()) => break,
                        Err(SendTimeoutError::Timeout(item)) => pending = item,
                        // every worker has stopped
                        Err(SendTimeoutError::Disconnected(_)) => break 'items,
                    }
                }
            }
            drop(sender);
        });

        let processed = processed.into_inner();
        if let Some(err) = failure.into_inner().unwrap_or_else(|e| e.into_inner()) {
            return Err(err);
        }
        if self.cancel.is_interrupted() {
            return Err(BatchError::Interrupted { processed, total });
        }

        let summary = BatchSummary {
            total,
            processed,
            workers: self.workers,
            started_at,
            finished_at: Utc::now(),
        };
        info!(processed, duration_ms = summary.duration_ms(), "batch complete");
        Ok(summary)
    }

    fn work(
        &self,
        worker: usize,
        receiver: Receiver<WorkItem>,
        processed: &AtomicUsize,
        failure: &Mutex<Option<BatchError>>,
    ) {
        while let Ok(item) = receiver.recv() {
            if self.cancel.is_cancelled() {
                break;
            }

            debug!(worker, index = item.index, from = %item.from.display(), "processing");
            match self.process_item(&item) {
                Ok(()) => {
                    processed.fetch_add(1, Ordering::SeqCst);
                }
                Err(source) => {
                    error!(from = %item.from.display(), error = %source, "file failed");
                    self.cancel.cancel();
                    let mut slot = failure.lock().unwrap_or_else(|e| e.into_inner());
                    if slot.is_none() {
                        *slot = Some(BatchError::File {
                            path: item.from,
                            source,
                        });
                    }
                    break;
                }
            }
        }
    }

    fn process_item(&self, item: &WorkItem) -> Result<(), FileError> {
        let locator = item.from.to_string_lossy();
        let value = self.processor.process(&locator, &self.options)?;
        save_json(&item.to, &value)?;
        Ok(())
    }
}
