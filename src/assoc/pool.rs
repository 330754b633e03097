//! Fixed-size worker pool for pairwise association jobs.
//!
//! Jobs and results travel over two unbounded channels. Shutdown is
//! cooperative: after all jobs are queued, one `Shutdown` message is
//! enqueued per worker, and each worker exits when it pops its own.
//! There is no timeout, cancellation, or retry; a worker that dies
//! without emitting its result leaves the coordinator waiting.

use crate::assoc::pair::PairJob;
use crate::assoc::tester::{test_pair, TesterConfig};
use crate::data::AssociationRecord;
use crate::error::{MinetError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread;

/// Tagged message on the job channel.
enum Message {
    Job(PairJob),
    Shutdown,
}

/// A fixed set of worker threads consuming pair jobs.
///
/// Workers share no mutable state; each owns its channel endpoints and a
/// per-job permutation generator derived from the job itself.
pub struct WorkerPool {
    job_tx: Sender<Message>,
    result_rx: Receiver<(usize, AssociationRecord)>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `n_workers` workers. Workers run before any job is submitted.
    pub fn start(n_workers: usize, config: TesterConfig) -> Result<Self> {
        if n_workers == 0 {
            return Err(MinetError::InvalidParameter(
                "Worker pool needs at least one worker".to_string(),
            ));
        }

        let (job_tx, job_rx) = unbounded::<Message>();
        let (result_tx, result_rx) = unbounded::<(usize, AssociationRecord)>();

        let handles = (0..n_workers)
            .map(|_| {
                let rx = job_rx.clone();
                let tx = result_tx.clone();
                let cfg = config.clone();
                thread::spawn(move || worker_loop(rx, tx, cfg))
            })
            .collect();

        Ok(Self {
            job_tx,
            result_rx,
            handles,
        })
    }

    /// Number of workers in the pool.
    pub fn n_workers(&self) -> usize {
        self.handles.len()
    }

    /// Queue one job.
    pub fn submit(&self, job: PairJob) -> Result<()> {
        self.job_tx
            .send(Message::Job(job))
            .map_err(|_| MinetError::Worker("Job channel closed".to_string()))
    }

    /// Queue one shutdown message per worker and collect exactly
    /// `n_jobs` results.
    ///
    /// Completion order is nondeterministic; records are re-keyed by the
    /// job sequence number and returned in pair order. Blocks until every
    /// result has arrived, then joins the workers.
    pub fn shutdown_and_collect(self, n_jobs: usize) -> Result<Vec<AssociationRecord>> {
        for _ in 0..self.handles.len() {
            self.job_tx
                .send(Message::Shutdown)
                .map_err(|_| MinetError::Worker("Job channel closed".to_string()))?;
        }

        let mut keyed: Vec<(usize, AssociationRecord)> = Vec::with_capacity(n_jobs);
        for done in 0..n_jobs {
            let item = self
                .result_rx
                .recv()
                .map_err(|_| MinetError::Worker("All workers exited early".to_string()))?;
            keyed.push(item);
            if (done + 1) % 100 == 0 {
                eprintln!("  {} / {} pairs tested", done + 1, n_jobs);
            }
        }

        for handle in self.handles {
            handle
                .join()
                .map_err(|_| MinetError::Worker("Worker thread panicked".to_string()))?;
        }

        keyed.sort_by_key(|(sequence, _)| *sequence);
        Ok(keyed.into_iter().map(|(_, record)| record).collect())
    }
}

/// Worker body: pop one message at a time, compute, push the result.
fn worker_loop(
    job_rx: Receiver<Message>,
    result_tx: Sender<(usize, AssociationRecord)>,
    config: TesterConfig,
) {
    while let Ok(message) = job_rx.recv() {
        match message {
            Message::Job(job) => {
                let record = test_pair(&job, &config);
                if result_tx.send((job.sequence, record)).is_err() {
                    break;
                }
            }
            Message::Shutdown => break,
        }
    }
}
