//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from the api-rpc crate.

use serde::{Deserialize, Serialize};

/// Request to push a new job
#[derive(Debug, Clone, Serialize)]
pub struct PushRequest {
    pub method: String,
    pub payload: serde_json::Value,
    pub priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl PushRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            payload: serde_json::Value::Null,
            priority: 0,
            channel: None,
            id: None,
        }
    }

    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Lower runs first
    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Caller-chosen id; pushing an existing id is a no-op
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PushResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PopRequest {
    pub channels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PopResponse {
    pub job: Option<Job>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FinishRequest {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdateRequest {
    pub id: String,
    pub progress: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UpdateResponse {
    pub progress: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct WaitRequest {
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct JobRequest {
    pub id: String,
}

/// A job as the server reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub serial: u64,
    pub method: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub priority: i64,
    pub channel: String,
    #[serde(default)]
    pub progress: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub done: bool,
}

/// Result of waiting on a set of jobs
#[derive(Debug, Clone, Deserialize)]
pub struct WaitResponse {
    /// False when the wait timed out before every job finished
    pub complete: bool,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelDepth {
    pub channel: String,
    pub pending: usize,
}

/// Queue diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueReport {
    pub submitted: u64,
    pub waiting: usize,
    pub busy_channels: Vec<ChannelDepth>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_request_omits_unset_fields() {
        let value = serde_json::to_value(PushRequest::new("render")).unwrap();
        assert_eq!(
            value,
            json!({"method": "render", "payload": null, "priority": 0})
        );
    }

    #[test]
    fn test_job_decodes_server_shape() {
        let job: Job = serde_json::from_value(json!({
            "id": "1",
            "serial": 1,
            "method": "render",
            "payload": {"book": 7},
            "priority": 0,
            "channel": "default",
            "progress": {"page": 3},
            "result": null,
            "error": null,
            "done": false
        }))
        .unwrap();
        assert_eq!(job.progress.get("page"), Some(&json!(3)));
        assert!(!job.done);
    }
}
