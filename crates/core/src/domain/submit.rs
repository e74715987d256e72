// Submission request

use super::error::{DomainError, Result};
use super::job::{ChannelName, JobId, JobMethod, JobPayload, Priority, DEFAULT_CHANNEL};
use serde::{Deserialize, Serialize};

/// Longest accepted channel name
pub const MAX_CHANNEL_NAME_LEN: usize = 64;

/// Deepest accepted payload nesting
pub const MAX_PAYLOAD_DEPTH: usize = 32;

/// Everything a producer supplies for a new job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub method: JobMethod,

    #[serde(default)]
    pub payload: JobPayload,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default = "default_channel")]
    pub channel: ChannelName,

    /// Caller-chosen id; the queue falls back to the serial when absent
    #[serde(default)]
    pub id: Option<JobId>,
}

fn default_channel() -> ChannelName {
    DEFAULT_CHANNEL.to_string()
}

impl SubmitRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: JobMethod::new(method),
            payload: JobPayload::default(),
            priority: 0,
            channel: default_channel(),
            id: None,
        }
    }

    pub fn payload(mut self, value: serde_json::Value) -> Self {
        self.payload = JobPayload::new(value);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Reject requests a remote producer should never be able to queue.
    ///
    /// The queue itself accepts anything; transports call this first.
    pub fn validate(&self) -> Result<()> {
        if self.method.as_str().trim().is_empty() {
            return Err(DomainError::Validation("method must not be empty".into()));
        }

        validate_channel_name(&self.channel)?;

        if let Some(id) = &self.id {
            if id.is_empty() {
                return Err(DomainError::Validation("id must not be empty".into()));
            }
        }

        if json_depth(self.payload.as_value()) > MAX_PAYLOAD_DEPTH {
            return Err(DomainError::Validation(format!(
                "payload is too deeply nested (max depth {})",
                MAX_PAYLOAD_DEPTH
            )));
        }

        Ok(())
    }
}

/// Channel names: 1..=64 chars of `[A-Za-z0-9_.:-]`
pub fn validate_channel_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DomainError::Validation("channel name is empty".into()));
    }
    if name.len() > MAX_CHANNEL_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "channel name too long ({} > {})",
            name.len(),
            MAX_CHANNEL_NAME_LEN
        )));
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-'));
    if !valid {
        return Err(DomainError::Validation(format!(
            "channel name must be alphanumeric (plus _ . : -): {}",
            name
        )));
    }
    Ok(())
}

fn json_depth(value: &serde_json::Value) -> usize {
    match value {
        serde_json::Value::Array(items) => 1 + items.iter().map(json_depth).max().unwrap_or(0),
        serde_json::Value::Object(map) => 1 + map.values().map(json_depth).max().unwrap_or(0),
        _ => 0,
    }
}
