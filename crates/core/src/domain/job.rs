// Job Domain Model

use serde::{Deserialize, Serialize};

/// Externally visible job identifier
pub type JobId = String;

/// Arrival-order tie-breaker, assigned once at first enqueue
pub type Serial = u64;

/// Priority (lower number = served first)
pub type Priority = i64;

/// Logical sub-queue name
pub type ChannelName = String;

/// Progress map, merged key by key on every update
pub type Progress = serde_json::Map<String, serde_json::Value>;

/// Channel used when a submission names none
pub const DEFAULT_CHANNEL: &str = "default";

/// Work-type tag, interpreted only by whichever worker executes the job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobMethod(String);

impl JobMethod {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque job payload (JSON serializable, never inspected by the queue)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPayload(serde_json::Value);

impl JobPayload {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// Readiness ordering: priority ascending, then serial ascending.
///
/// Field order matters, the derived `Ord` compares `priority` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderingKey {
    pub priority: Priority,
    pub serial: Serial,
}

/// Point-in-time view of a job.
///
/// This is also the wire contract for transports layered on top of the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub serial: Serial,
    pub method: JobMethod,
    #[serde(default)]
    pub payload: JobPayload,
    #[serde(default)]
    pub priority: Priority,
    pub channel: ChannelName,

    #[serde(default)]
    pub progress: Progress,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub done: bool,
}

impl Job {
    pub fn ordering_key(&self) -> OrderingKey {
        OrderingKey {
            priority: self.priority,
            serial: self.serial,
        }
    }

    /// Finished without an error value
    pub fn succeeded(&self) -> bool {
        self.done && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ordering_key_priority_first() {
        let urgent_late = OrderingKey {
            priority: 1,
            serial: 10,
        };
        let lazy_early = OrderingKey {
            priority: 5,
            serial: 1,
        };
        assert!(urgent_late < lazy_early);
    }

    #[test]
    fn test_ordering_key_serial_breaks_ties() {
        let first = OrderingKey {
            priority: 3,
            serial: 1,
        };
        let second = OrderingKey {
            priority: 3,
            serial: 2,
        };
        assert!(first < second);
    }

    #[test]
    fn test_negative_priority_sorts_before_default() {
        let negative = OrderingKey {
            priority: -1,
            serial: 9,
        };
        let default = OrderingKey {
            priority: 0,
            serial: 1,
        };
        assert!(negative < default);
    }

    #[test]
    fn test_job_wire_format() {
        let job = Job {
            id: "7".to_string(),
            serial: 7,
            method: JobMethod::new("render"),
            payload: JobPayload::new(json!({"pages": [1, 2]})),
            priority: 2,
            channel: "pdf".to_string(),
            progress: Progress::new(),
            result: None,
            error: None,
            done: false,
        };

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["method"], json!("render"));
        assert_eq!(value["payload"], json!({"pages": [1, 2]}));
        assert_eq!(value["result"], json!(null));
        assert_eq!(value["done"], json!(false));

        let back: Job = serde_json::from_value(value).unwrap();
        assert_eq!(back, job);
    }

    #[test]
    fn test_succeeded_requires_done_without_error() {
        let mut job: Job = serde_json::from_value(json!({
            "id": "a", "serial": 1, "method": "m", "channel": "default"
        }))
        .unwrap();
        assert!(!job.succeeded());

        job.done = true;
        assert!(job.succeeded());

        job.error = Some(json!("boom"));
        assert!(!job.succeeded());
    }
}
