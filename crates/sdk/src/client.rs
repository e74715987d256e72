//! workq Client Implementation

use crate::error::Result;
use crate::types::{
    FinishRequest, Job, JobRequest, PopRequest, PopResponse, PushRequest, PushResponse,
    QueueReport, UpdateRequest, UpdateResponse, WaitRequest, WaitResponse,
};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::Serialize;
use std::time::Duration;

/// HTTP request timeout; server-side pop waits stay below it
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Send a request struct as named JSON-RPC params
fn object_params<T: Serialize>(req: &T) -> Result<ObjectParams> {
    let mut params = ObjectParams::new();
    if let serde_json::Value::Object(map) = serde_json::to_value(req)? {
        for (key, value) in map {
            params.insert(&key, value)?;
        }
    }
    Ok(params)
}

/// workq daemon client
///
/// # Example
///
/// ```no_run
/// use workq_sdk::WorkqClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = WorkqClient::connect("http://127.0.0.1:9531").await?;
/// let report = client.report().await?;
/// println!("{} jobs submitted", report.submitted);
/// # Ok(())
/// # }
/// ```
pub struct WorkqClient {
    client: HttpClient,
}

impl WorkqClient {
    /// Connect to a workq daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9531`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        Self::connect_with_timeout(url, DEFAULT_REQUEST_TIMEOUT).await
    }

    /// Connect with a custom HTTP request timeout. Keep it above any pop/wait
    /// timeout you pass.
    pub async fn connect_with_timeout(url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(timeout)
            .build(url)
            .map_err(|e| crate::SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Push a job and return its id
    pub async fn push(&self, request: PushRequest) -> Result<String> {
        let response: PushResponse = self
            .client
            .request("queue.push.v1", object_params(&request)?)
            .await?;
        Ok(response.id)
    }

    /// Pop the best ready job from `channels` (empty = any channel).
    ///
    /// Returns `None` when nothing arrived within `timeout` (server default
    /// when `None`).
    pub async fn pop(&self, channels: &[&str], timeout: Option<Duration>) -> Result<Option<Job>> {
        let request = PopRequest {
            channels: channels.iter().map(|c| c.to_string()).collect(),
            timeout_ms: timeout.map(|t| t.as_millis() as u64),
        };
        let response: PopResponse = self
            .client
            .request("queue.pop.v1", object_params(&request)?)
            .await?;
        Ok(response.job)
    }

    /// Report a job's outcome
    pub async fn finish(
        &self,
        id: impl Into<String>,
        result: Option<serde_json::Value>,
        error: Option<serde_json::Value>,
    ) -> Result<()> {
        let request = FinishRequest {
            id: id.into(),
            result,
            error,
        };
        let _: serde_json::Value = self
            .client
            .request("queue.finish.v1", object_params(&request)?)
            .await?;
        Ok(())
    }

    /// Merge progress into a job; returns the merged progress map
    pub async fn update(
        &self,
        id: impl Into<String>,
        progress: serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Map<String, serde_json::Value>> {
        let request = UpdateRequest {
            id: id.into(),
            progress,
        };
        let response: UpdateResponse = self
            .client
            .request("queue.update.v1", object_params(&request)?)
            .await?;
        Ok(response.progress)
    }

    /// Wait for jobs to finish. Without a timeout this blocks until they do
    /// (bounded only by the HTTP request timeout).
    pub async fn wait(&self, ids: &[String], timeout: Option<Duration>) -> Result<WaitResponse> {
        let request = WaitRequest {
            ids: ids.to_vec(),
            timeout_ms: timeout.map(|t| t.as_millis() as u64),
        };
        let response: WaitResponse = self
            .client
            .request("queue.wait.v1", object_params(&request)?)
            .await?;
        Ok(response)
    }

    /// Look up a single job
    pub async fn job(&self, id: impl Into<String>) -> Result<Job> {
        let request = JobRequest { id: id.into() };
        let job: Job = self
            .client
            .request("queue.job.v1", object_params(&request)?)
            .await?;
        Ok(job)
    }

    /// Queue diagnostics
    pub async fn report(&self) -> Result<QueueReport> {
        let report: QueueReport = self
            .client
            .request("queue.report.v1", rpc_params![])
            .await?;
        Ok(report)
    }
}
