//! Concurrent batch generation.
//!
//! A batch of `total_rows` is split into contiguous index ranges, one per
//! worker thread. Worker `i` covers the range right after worker `i - 1`,
//! and the first `total_rows % workers` workers take one extra row. Each
//! worker seeds its own RNG from the base seed and its first index, so a
//! batch is reproducible for a given seed, row count and worker count.
//!
//! ```text
//!   total=10, workers=3
//!   worker 0: [0..4)   worker 1: [4..7)   worker 2: [7..10)
//! ```

use crate::error::GeneratorError;
use crate::generator::DataGenerator;
use crate::model::BoundModel;
use datagen_core::Row;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Rows a worker builds between updates of the shared progress counter.
const PROGRESS_INTERVAL: u64 = 64;

/// Split `total_rows` starting at `start_index` into per-worker ranges.
///
/// A worker count of 0 is treated as 1. Empty ranges are omitted.
pub fn partition(start_index: u64, total_rows: u64, workers: usize) -> Vec<Range<u64>> {
    let workers = workers.max(1) as u64;
    let base = total_rows / workers;
    let extra = total_rows % workers;
    let mut next = start_index;
    (0..workers)
        .filter_map(|worker| {
            let len = base + u64::from(worker < extra);
            if len == 0 {
                return None;
            }
            let range = next..next + len;
            next += len;
            Some(range)
        })
        .collect()
}

/// Cooperative cancellation shared by all workers of a run.
///
/// Workers check the flag between rows.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Rows of one batch in worker order.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub rows: Vec<Row>,
    /// At least one worker stopped early
    pub cancelled: bool,
    /// Number of workers that ran
    pub workers: usize,
    pub duration: Duration,
}

impl BatchResult {
    pub fn rows_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.rows.len() as f64 / secs
        } else {
            0.0
        }
    }
}

struct WorkerOutput {
    rows: Vec<Row>,
    cancelled: bool,
}

/// Runs batches of a bound model on worker threads.
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    model: Arc<BoundModel>,
    seed: u64,
    cancellation: CancellationFlag,
    /// Rows built by all workers, across batches
    generated: Arc<AtomicU64>,
}

impl BatchScheduler {
    pub fn new(model: Arc<BoundModel>, seed: u64) -> Self {
        Self {
            model,
            seed,
            cancellation: CancellationFlag::new(),
            generated: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Use an externally owned cancellation flag.
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rows built so far by every batch of this scheduler.
    ///
    /// Workers publish their progress every few dozen rows, so the value
    /// can lag behind the rows actually built while a batch runs.
    pub fn rows_generated(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    pub fn model(&self) -> &BoundModel {
        &self.model
    }

    /// Generate `total_rows` rows with global indices starting at 0.
    pub fn generate(&self, total_rows: u64, workers: usize) -> Result<BatchResult, GeneratorError> {
        self.generate_from(0, total_rows, workers)
    }

    /// Generate `total_rows` rows with global indices starting at
    /// `start_index`.
    ///
    /// On cancellation the rows produced so far are returned and the result
    /// is marked cancelled.
    pub fn generate_from(
        &self,
        start_index: u64,
        total_rows: u64,
        workers: usize,
    ) -> Result<BatchResult, GeneratorError> {
        let ranges = partition(start_index, total_rows, workers);
        let started = Instant::now();
        debug!(
            "Starting batch of {total_rows} row(s) at index {start_index} on {} worker(s)",
            ranges.len()
        );

        let outputs: Vec<Result<WorkerOutput, GeneratorError>> = thread::scope(|scope| {
            let handles: Vec<_> = ranges
                .iter()
                .cloned()
                .enumerate()
                .map(|(worker, range)| scope.spawn(move || self.run_worker(worker, range)))
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(worker, handle)| {
                    handle
                        .join()
                        .map_err(|_| GeneratorError::WorkerPanicked(worker))
                })
                .collect()
        });

        let mut rows = Vec::with_capacity(usize::try_from(total_rows).unwrap_or(0));
        let mut cancelled = false;
        for output in outputs {
            let output = output?;
            cancelled |= output.cancelled;
            rows.extend(output.rows);
        }

        let result = BatchResult {
            rows,
            cancelled,
            workers: ranges.len(),
            duration: started.elapsed(),
        };
        if result.cancelled {
            warn!(
                "Batch cancelled after {} of {total_rows} row(s)",
                result.rows.len()
            );
        } else {
            info!(
                "Generated {} row(s) on {} worker(s) in {:?} ({:.0} rows/sec)",
                result.rows.len(),
                result.workers,
                result.duration,
                result.rows_per_second()
            );
        }
        Ok(result)
    }

    fn run_worker(&self, worker: usize, range: Range<u64>) -> WorkerOutput {
        let mut generator =
            DataGenerator::new(Arc::clone(&self.model), self.seed).with_start_index(range.start);
        let quota = range.end - range.start;
        let mut rows = Vec::with_capacity(usize::try_from(quota).unwrap_or(0));
        let mut cancelled = false;

        let mut unpublished = 0;
        for _ in range {
            if self.cancellation.is_cancelled() {
                cancelled = true;
                break;
            }
            rows.push(generator.next_row());
            unpublished += 1;
            if unpublished == PROGRESS_INTERVAL {
                self.generated.fetch_add(unpublished, Ordering::Relaxed);
                unpublished = 0;
            }
        }
        self.generated.fetch_add(unpublished, Ordering::Relaxed);

        debug!(worker, rows = rows.len(), quota, cancelled, "Worker finished");
        WorkerOutput { rows, cancelled }
    }
}
