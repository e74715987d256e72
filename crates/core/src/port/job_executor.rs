// Job Executor Port
// Abstraction for running a job's method; the queue never interprets it

use crate::application::queue::WorkQueue;
use crate::domain::{Job, JobId, Progress};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Execution errors, reported back to the queue as the job's `error`
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Job failed: {0}")]
    Failed(String),
}

/// Progress sink bound to a single job
#[derive(Clone)]
pub struct ProgressReporter {
    queue: Arc<WorkQueue>,
    job_id: JobId,
}

impl ProgressReporter {
    pub fn new(queue: Arc<WorkQueue>, job_id: impl Into<String>) -> Self {
        Self {
            queue,
            job_id: job_id.into(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Merge `partial` into the job's progress
    pub fn update(&self, partial: Progress) -> crate::error::Result<()> {
        self.queue.update_progress(&self.job_id, partial)
    }

    /// Convenience for a single progress key
    pub fn set(
        &self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> crate::error::Result<()> {
        let mut partial = Progress::new();
        partial.insert(key.into(), value);
        self.update(partial)
    }
}

/// Job Executor trait
///
/// Implementations dispatch on `job.method` and return the job's result.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Execute a job and return its result value
    ///
    /// # Errors
    /// - ExecutionError::UnknownMethod if the method is not handled here
    /// - ExecutionError::InvalidPayload if the payload is malformed
    /// - ExecutionError::Failed for any other failure
    async fn execute(
        &self,
        job: &Job,
        progress: &ProgressReporter,
    ) -> Result<serde_json::Value, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock executor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Echo the payload back as the result
        Echo,
        /// Always fail with message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
        /// Report `steps` progress updates, then echo
        Progress(u32),
        /// Sleep, then echo
        Slow(Duration),
    }

    /// Mock Job Executor for testing
    pub struct MockJobExecutor {
        behavior: Mutex<MockBehavior>,
        call_count: AtomicUsize,
        seen: Mutex<Vec<JobId>>,
    }

    impl MockJobExecutor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Mutex::new(behavior),
                call_count: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn new_echo() -> Self {
            Self::new(MockBehavior::Echo)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Ids of executed jobs, in execution order
        pub fn seen(&self) -> Vec<JobId> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JobExecutor for MockJobExecutor {
        async fn execute(
            &self,
            job: &Job,
            progress: &ProgressReporter,
        ) -> Result<serde_json::Value, ExecutionError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(job.id.clone());

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Echo => Ok(job.payload.as_value().clone()),
                MockBehavior::Fail(msg) => Err(ExecutionError::Failed(msg)),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
                MockBehavior::Progress(steps) => {
                    for step in 1..=steps {
                        progress
                            .set("step", serde_json::json!(step))
                            .map_err(|e| ExecutionError::Failed(e.to_string()))?;
                    }
                    Ok(job.payload.as_value().clone())
                }
                MockBehavior::Slow(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(job.payload.as_value().clone())
                }
            }
        }
    }
}
