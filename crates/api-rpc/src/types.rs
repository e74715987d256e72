//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results. Jobs travel in their
//! domain wire form ([`Job`]).

use serde::{Deserialize, Serialize};
use workq_core::domain::{Job, JobId, Priority, Progress, SubmitRequest, DEFAULT_CHANNEL};

/// queue.push.v1 - Submit a job
#[derive(Debug, Deserialize)]
pub struct PushRequest {
    pub method: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub id: Option<JobId>,
}

impl From<PushRequest> for SubmitRequest {
    fn from(req: PushRequest) -> Self {
        let mut submit = SubmitRequest::new(req.method)
            .payload(req.payload)
            .priority(req.priority)
            .channel(req.channel.unwrap_or_else(|| DEFAULT_CHANNEL.to_string()));
        submit.id = req.id;
        submit
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PushResponse {
    pub id: JobId,
}

/// queue.pop.v1 - Take the best ready job from a set of channels
#[derive(Debug, Deserialize)]
pub struct PopRequest {
    /// Empty means any channel
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopResponse {
    /// `None` when the wait timed out
    pub job: Option<Job>,
}

/// queue.finish.v1 - Report a job's outcome
#[derive(Debug, Deserialize)]
pub struct FinishRequest {
    pub id: JobId,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinishResponse {
    pub id: JobId,
    pub done: bool,
}

/// queue.update.v1 - Merge progress into a job
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub id: JobId,
    pub progress: Progress,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse {
    pub id: JobId,
    pub progress: Progress,
}

/// queue.wait.v1 - Wait for a set of jobs to finish
#[derive(Debug, Deserialize)]
pub struct WaitRequest {
    pub ids: Vec<JobId>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaitResponse {
    /// False when the timeout expired first; `jobs` then holds current views
    pub complete: bool,
    pub jobs: Vec<Job>,
}

/// queue.job.v1 - Look up one job
#[derive(Debug, Deserialize)]
pub struct JobRequest {
    pub id: JobId,
}
