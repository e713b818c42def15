//! Bounded in-process dispatch queue.
//!
//! Intake hands accepted submissions to a bounded mpsc channel; a small
//! pool of worker tasks drains it and runs [`dispatch_submission`] per
//! job. Enqueueing never blocks the request path: when the queue is full
//! the job is dropped with an error log and the submission row simply
//! stays `pending`.

use std::sync::Arc;
use std::time::Duration;

use formgate_db::DbPool;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::dispatch_submission;
use crate::sender::{RetryPolicy, WebhookSender};

/// One accepted submission awaiting webhook delivery.
///
/// Carries the request `meta` object in memory because only its
/// `attributes` member is persisted; a job lost to a restart leaves the
/// submission row at `pending`, which is the documented contract.
#[derive(Debug, Clone)]
pub struct DispatchJob {
    pub submission_id: i64,
    pub form_id: String,
    pub version: i32,
    pub meta: serde_json::Value,
}

/// Queue tuning knobs, taken from server configuration.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub signing_key: String,
    pub retry: RetryPolicy,
    pub workers: usize,
    pub capacity: usize,
}

// ---------------------------------------------------------------------------
// Queue handle
// ---------------------------------------------------------------------------

/// Cheaply cloneable producer half, held by the request handlers.
#[derive(Clone)]
pub struct DispatchQueue {
    tx: mpsc::Sender<DispatchJob>,
}

impl DispatchQueue {
    /// Enqueue a job without waiting. A full queue drops the job and logs;
    /// the submission keeps its `pending` status.
    pub fn enqueue(&self, job: DispatchJob) {
        let submission_id = job.submission_id;
        if let Err(e) = self.tx.try_send(job) {
            tracing::error!(
                submission_id,
                error = %e,
                "dispatch queue full, submission stays pending"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Worker pool
// ---------------------------------------------------------------------------

/// The consumer half: worker tasks plus the token used to stop them.
pub struct DispatchWorkers {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl DispatchWorkers {
    /// Stop accepting new work, drain jobs already queued, and wait for
    /// the workers to exit, up to `timeout` in total.
    pub async fn shutdown(self, timeout: Duration) {
        self.cancel.cancel();
        let join_all = async {
            for handle in self.handles {
                let _ = handle.await;
            }
        };
        if tokio::time::timeout(timeout, join_all).await.is_err() {
            tracing::warn!("dispatch workers did not drain before shutdown timeout");
        }
    }
}

/// Start the dispatch worker pool. Returns the producer handle for the
/// request path and the worker set for shutdown.
pub fn start(pool: DbPool, config: DispatchConfig) -> (DispatchQueue, DispatchWorkers) {
    let (tx, rx) = mpsc::channel::<DispatchJob>(config.capacity.max(1));
    let rx = Arc::new(Mutex::new(rx));
    let sender = Arc::new(WebhookSender::new(
        config.signing_key.clone(),
        config.retry.clone(),
    ));
    let cancel = CancellationToken::new();

    let workers = config.workers.max(1);
    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        handles.push(tokio::spawn(worker_loop(
            worker_id,
            pool.clone(),
            Arc::clone(&sender),
            Arc::clone(&rx),
            cancel.clone(),
        )));
    }
    tracing::info!(workers, capacity = config.capacity, "dispatch queue started");

    (DispatchQueue { tx }, DispatchWorkers { cancel, handles })
}

/// Pull jobs until the channel closes. After cancellation the worker keeps
/// draining jobs that are already queued and exits once the queue is empty.
async fn worker_loop(
    worker_id: usize,
    pool: DbPool,
    sender: Arc<WebhookSender>,
    rx: Arc<Mutex<mpsc::Receiver<DispatchJob>>>,
    cancel: CancellationToken,
) {
    loop {
        let job = {
            let mut rx = rx.lock().await;
            tokio::select! {
                _ = cancel.cancelled() => rx.try_recv().ok(),
                job = rx.recv() => job,
            }
        };
        let Some(job) = job else {
            tracing::info!(worker_id, "dispatch worker shutting down");
            break;
        };
        if let Err(e) = dispatch_submission(&pool, &sender, &job).await {
            tracing::error!(
                worker_id,
                submission_id = job.submission_id,
                error = %e,
                "webhook dispatch failed"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
