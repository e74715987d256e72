// Work Queue - submit/take across channel queues with direct hand-off

mod channels;
mod record;
mod report;
mod waiters;

pub use report::{ChannelDepth, QueueReport};
pub use waiters::Interest;

use crate::domain::{DomainError, Job, JobId, Progress, Serial, SubmitRequest};
use crate::error::{AppError, Result};
use channels::ChannelStore;
use record::JobRecord;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use waiters::{WaiterId, WaiterRegistry};

/// Everything guarded by the single queue lock
#[derive(Debug, Default)]
struct QueueState {
    channels: ChannelStore,
    waiters: WaiterRegistry,
    jobs: HashMap<JobId, Arc<JobRecord>>,
    count: Serial,
}

impl QueueState {
    /// Direct hand-off to the first matching waiter, else the channel queue.
    ///
    /// A matching waiter always wins, even over better-priority backlog
    /// sitting in other channels.
    fn dispatch(&mut self, record: Arc<JobRecord>) {
        match self.waiters.deliver(record) {
            Ok(_) => {}
            Err(record) => {
                debug!(
                    job_id = %record.id(),
                    channel = %record.channel(),
                    depth = self.channels.depth(record.channel()) + 1,
                    "Job queued"
                );
                self.channels.push(record);
            }
        }
    }

    fn lookup(&self, id: &str) -> Result<Arc<JobRecord>> {
        self.jobs
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::Domain(DomainError::JobNotFound(id.to_string())))
    }
}

/// In-process priority work queue.
///
/// Producers [`submit`](WorkQueue::submit) jobs into named channels, consumers
/// [`take`](WorkQueue::take) the best ready job from a set of channels and
/// report back with [`complete`](WorkQueue::complete). Instances share no
/// state with each other.
#[derive(Debug, Default)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        // No code path panics halfway through a state mutation.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit a job and return its id.
    ///
    /// Submitting an id that already exists is a no-op returning that id;
    /// none of the new request's fields are applied.
    pub fn submit(&self, req: SubmitRequest) -> JobId {
        let mut state = self.state();

        if let Some(id) = req.id.as_deref() {
            if state.jobs.contains_key(id) {
                debug!(job_id = %id, "Duplicate submission ignored");
                return id.to_string();
            }
        }

        state.count += 1;
        let id = match req.id {
            Some(id) => id,
            None => {
                // Skip serials whose decimal form a caller already took as an id.
                while state.jobs.contains_key(&state.count.to_string()) {
                    state.count += 1;
                }
                state.count.to_string()
            }
        };
        let serial = state.count;

        let record = Arc::new(JobRecord::new(
            id.clone(),
            serial,
            req.method,
            req.payload,
            req.priority,
            req.channel,
        ));
        debug!(
            job_id = %id,
            serial,
            priority = req.priority,
            channel = %record.channel(),
            "Job submitted"
        );

        state.jobs.insert(id.clone(), Arc::clone(&record));
        state.dispatch(record);
        id
    }

    /// Take the best ready job among `interest`, waiting for a delivery when
    /// none is ready.
    ///
    /// Cancel-safe: dropping the future deregisters the waiter, and a job that
    /// was already handed over is put back into circulation.
    pub async fn take(&self, interest: Interest) -> Result<Job> {
        let (waiter, rx) = {
            let mut state = self.state();
            if let Some(record) = state.channels.pop_best(&interest) {
                debug!(job_id = %record.id(), channel = %record.channel(), "Job taken");
                return Ok(record.snapshot());
            }
            debug!(interest = %interest, waiters = state.waiters.len() + 1, "Waiting for job");
            state.waiters.register(interest)
        };

        let mut pending = PendingTake {
            queue: self,
            waiter,
            rx: Some(rx),
        };
        pending.wait().await
    }

    /// [`take`](WorkQueue::take) bounded by `timeout`; `None` when it expired.
    pub async fn take_timeout(&self, interest: Interest, timeout: Duration) -> Result<Option<Job>> {
        match tokio::time::timeout(timeout, self.take(interest)).await {
            Ok(job) => job.map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Record the outcome of a job and wake everyone waiting on it.
    ///
    /// Calling it again overwrites the outcome.
    pub fn complete(
        &self,
        id: &str,
        result: Option<serde_json::Value>,
        error: Option<serde_json::Value>,
    ) -> Result<()> {
        let record = self.state().lookup(id)?;
        if error.is_some() {
            debug!(job_id = %id, "Job finished with error");
        } else {
            debug!(job_id = %id, "Job finished");
        }
        record.finish(result, error);
        Ok(())
    }

    /// Merge `partial` into the job's progress map
    pub fn update_progress(&self, id: &str, partial: Progress) -> Result<()> {
        let record = self.state().lookup(id)?;
        record.merge_progress(partial);
        Ok(())
    }

    /// Wait until every job in `ids` is done, in the given order.
    ///
    /// All ids are resolved before waiting, so an unknown id fails fast.
    pub async fn await_all(&self, ids: &[JobId]) -> Result<Vec<Job>> {
        let records = self.lookup_all(ids)?;
        for record in &records {
            record.wait_finished().await;
        }
        Ok(records.iter().map(|r| r.snapshot()).collect())
    }

    /// [`await_all`](WorkQueue::await_all) bounded by `timeout`; `None` when
    /// it expired. Unknown ids still fail immediately.
    pub async fn await_all_timeout(
        &self,
        ids: &[JobId],
        timeout: Duration,
    ) -> Result<Option<Vec<Job>>> {
        let records = self.lookup_all(ids)?;
        let all_done = async {
            for record in &records {
                record.wait_finished().await;
            }
        };
        match tokio::time::timeout(timeout, all_done).await {
            Ok(()) => Ok(Some(records.iter().map(|r| r.snapshot()).collect())),
            Err(_) => Ok(None),
        }
    }

    /// Current view of a single job
    pub fn get(&self, id: &str) -> Result<Job> {
        Ok(self.state().lookup(id)?.snapshot())
    }

    /// Current view of several jobs, failing on the first unknown id
    pub fn get_all(&self, ids: &[JobId]) -> Result<Vec<Job>> {
        Ok(self.lookup_all(ids)?.iter().map(|r| r.snapshot()).collect())
    }

    fn lookup_all(&self, ids: &[JobId]) -> Result<Vec<Arc<JobRecord>>> {
        let state = self.state();
        ids.iter().map(|id| state.lookup(id)).collect()
    }

    pub fn snapshot(&self) -> QueueReport {
        let state = self.state();
        QueueReport {
            submitted: state.jobs.len() as u64,
            waiting: state.waiters.len(),
            busy_channels: state
                .channels
                .busy_channels()
                .into_iter()
                .map(|(channel, pending)| ChannelDepth { channel, pending })
                .collect(),
        }
    }

    /// Log the current snapshot
    pub fn report(&self) -> QueueReport {
        let report = self.snapshot();
        if report.is_idle() {
            info!(
                submitted = report.submitted,
                waiting = report.waiting,
                "Queue report: all channels idle"
            );
        } else {
            let busy: Vec<String> = report
                .busy_channels
                .iter()
                .map(|c| format!("{}={}", c.channel, c.pending))
                .collect();
            info!(
                submitted = report.submitted,
                waiting = report.waiting,
                pending = report.pending(),
                busy = %busy.join(" "),
                "Queue report"
            );
        }
        report
    }

    /// Abandoned-waiter cleanup, run with the receiver still alive
    fn abandon(&self, waiter: WaiterId, mut rx: oneshot::Receiver<Arc<JobRecord>>) {
        let mut state = self.state();
        if state.waiters.remove(waiter) {
            debug!("Waiter deregistered before delivery");
            return;
        }
        // Deliveries happen under the lock, so the slot is filled by now.
        if let Ok(record) = rx.try_recv() {
            warn!(
                job_id = %record.id(),
                channel = %record.channel(),
                "Reclaiming job delivered to abandoned waiter"
            );
            state.dispatch(record);
        }
    }
}

/// A registered waiter; deregisters itself when dropped before delivery
struct PendingTake<'q> {
    queue: &'q WorkQueue,
    waiter: WaiterId,
    rx: Option<oneshot::Receiver<Arc<JobRecord>>>,
}

impl PendingTake<'_> {
    async fn wait(&mut self) -> Result<Job> {
        let Some(rx) = self.rx.as_mut() else {
            return Err(AppError::Internal("waiter already resolved".to_string()));
        };
        let delivered = rx.await;
        self.rx = None;
        match delivered {
            Ok(record) => {
                debug!(job_id = %record.id(), channel = %record.channel(), "Job handed off");
                Ok(record.snapshot())
            }
            Err(_) => Err(AppError::Internal(
                "delivery slot closed without a job".to_string(),
            )),
        }
    }
}

impl Drop for PendingTake<'_> {
    fn drop(&mut self) {
        if let Some(rx) = self.rx.take() {
            self.queue.abandon(self.waiter, rx);
        }
    }
}
