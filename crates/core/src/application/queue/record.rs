// Live job record shared between the registry, channel queues and consumers

use crate::domain::{
    ChannelName, CompletionSignal, Job, JobId, JobMethod, JobPayload, OrderingKey, Priority,
    Progress, Serial,
};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Mutable part of a job, guarded by its own lock so progress and completion
/// updates never contend with the queue lock.
#[derive(Debug, Default)]
struct JobStatus {
    progress: Progress,
    result: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
    done: bool,
}

#[derive(Debug)]
pub(crate) struct JobRecord {
    id: JobId,
    serial: Serial,
    method: JobMethod,
    payload: JobPayload,
    priority: Priority,
    channel: ChannelName,
    status: Mutex<JobStatus>,
    finished: CompletionSignal,
}

impl JobRecord {
    pub(crate) fn new(
        id: JobId,
        serial: Serial,
        method: JobMethod,
        payload: JobPayload,
        priority: Priority,
        channel: ChannelName,
    ) -> Self {
        Self {
            id,
            serial,
            method,
            payload,
            priority,
            channel,
            status: Mutex::new(JobStatus::default()),
            finished: CompletionSignal::new(),
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn channel(&self) -> &str {
        &self.channel
    }

    pub(crate) fn key(&self) -> OrderingKey {
        OrderingKey {
            priority: self.priority,
            serial: self.serial,
        }
    }

    fn status(&self) -> MutexGuard<'_, JobStatus> {
        // Status writes are single assignments, a poisoned guard is still consistent.
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn merge_progress(&self, partial: Progress) {
        let mut status = self.status();
        for (key, value) in partial {
            status.progress.insert(key, value);
        }
    }

    pub(crate) fn finish(
        &self,
        result: Option<serde_json::Value>,
        error: Option<serde_json::Value>,
    ) {
        {
            let mut status = self.status();
            status.result = result;
            status.error = error;
            status.done = true;
        }
        self.finished.set();
    }

    pub(crate) async fn wait_finished(&self) {
        self.finished.wait().await;
    }

    pub(crate) fn snapshot(&self) -> Job {
        let status = self.status();
        Job {
            id: self.id.clone(),
            serial: self.serial,
            method: self.method.clone(),
            payload: self.payload.clone(),
            priority: self.priority,
            channel: self.channel.clone(),
            progress: status.progress.clone(),
            result: status.result.clone(),
            error: status.error.clone(),
            done: status.done,
        }
    }
}
