// Worker - consumer loop over a set of channels

pub mod constants;
mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::queue::{Interest, WorkQueue};
use crate::domain::Job;
use crate::error::Result;
use crate::port::{JobExecutor, ProgressReporter};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Worker takes jobs from the channels it serves, runs them through a
/// [`JobExecutor`] and reports the outcome back to the queue.
pub struct Worker {
    name: String,
    queue: Arc<WorkQueue>,
    interest: Interest,
    executor: Arc<dyn JobExecutor>,
}

impl Worker {
    pub fn new(
        name: impl Into<String>,
        queue: Arc<WorkQueue>,
        interest: Interest,
        executor: Arc<dyn JobExecutor>,
    ) -> Self {
        Self {
            name: name.into(),
            queue,
            interest,
            executor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run worker loop with graceful shutdown support
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(worker = %self.name, channels = %self.interest, "Worker started");
        loop {
            if shutdown.is_shutdown() {
                break;
            }
            // Dropping the pending take on shutdown deregisters the waiter.
            tokio::select! {
                taken = self.queue.take(self.interest.clone()) => {
                    let job = taken?;
                    self.execute(job).await;
                }
                _ = shutdown.wait() => {
                    info!(worker = %self.name, "Worker interrupted while waiting");
                    break;
                }
            }
        }
        info!(worker = %self.name, "Worker stopped");
        Ok(())
    }

    /// Take one job (waiting if needed), execute it and report back.
    /// Returns the finished job.
    pub async fn process_next_job(&self) -> Result<Job> {
        let job = self.queue.take(self.interest.clone()).await?;
        let id = job.id.clone();
        self.execute(job).await;
        self.queue.get(&id)
    }

    async fn execute(&self, job: Job) {
        info!(
            worker = %self.name,
            job_id = %job.id,
            method = %job.method,
            channel = %job.channel,
            "Processing job"
        );

        let id = job.id.clone();
        let executor = Arc::clone(&self.executor);
        let progress = ProgressReporter::new(Arc::clone(&self.queue), id.clone());

        // Spawned so a panicking executor cannot take the worker down.
        let handle =
            tokio::task::spawn(async move { executor.execute(&job, &progress).await });

        let (result, error) = match handle.await {
            Ok(Ok(value)) => {
                info!(job_id = %id, "Job completed");
                (Some(value), None)
            }
            Ok(Err(e)) => {
                warn!(job_id = %id, error = %e, "Job failed");
                (None, Some(json!(e.to_string())))
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    error!(job_id = %id, "Job panicked: {:?}", join_err);
                    (None, Some(json!(format!("panicked: {}", panic_message(join_err)))))
                } else {
                    error!(job_id = %id, "Job cancelled: {:?}", join_err);
                    (None, Some(json!("cancelled")))
                }
            }
        };

        if let Err(e) = self.queue.complete(&id, result, error) {
            error!(job_id = %id, error = %e, "Failed to report job outcome");
        }
    }
}

fn panic_message(err: tokio::task::JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => {
            if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            }
        }
        Err(_) => "Unknown panic".to_string(),
    }
}
