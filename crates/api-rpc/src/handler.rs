//! RPC Method Handlers
//!
//! Implements each JSON-RPC method on top of the shared queue.

use crate::error::to_rpc_error;
use crate::types::{
    FinishRequest, FinishResponse, JobRequest, PopRequest, PopResponse, PushRequest,
    PushResponse, UpdateRequest, UpdateResponse, WaitRequest, WaitResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use workq_core::application::worker::constants::{DEFAULT_POP_TIMEOUT, MAX_WAIT_TIMEOUT};
use workq_core::domain::{Job, SubmitRequest};
use workq_core::error::AppError;
use workq_core::{Interest, QueueReport, WorkQueue};

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    queue: Arc<WorkQueue>,
}

fn bounded(timeout_ms: u64) -> Duration {
    Duration::from_millis(timeout_ms).min(MAX_WAIT_TIMEOUT)
}

impl RpcHandler {
    pub fn new(queue: Arc<WorkQueue>) -> Self {
        Self { queue }
    }

    /// queue.push.v1
    pub async fn push(&self, params: PushRequest) -> Result<PushResponse, ErrorObjectOwned> {
        let req = SubmitRequest::from(params);
        req.validate()
            .map_err(|e| to_rpc_error(AppError::Domain(e)))?;

        let id = self.queue.submit(req);
        Ok(PushResponse { id })
    }

    /// queue.pop.v1
    pub async fn pop(&self, params: PopRequest) -> Result<PopResponse, ErrorObjectOwned> {
        let timeout = params
            .timeout_ms
            .map(bounded)
            .unwrap_or(DEFAULT_POP_TIMEOUT);
        let interest = Interest::of(params.channels);

        debug!(channels = %interest, timeout_ms = timeout.as_millis() as u64, "Remote pop");
        let job = self
            .queue
            .take_timeout(interest, timeout)
            .await
            .map_err(to_rpc_error)?;

        Ok(PopResponse { job })
    }

    /// queue.finish.v1
    pub async fn finish(&self, params: FinishRequest) -> Result<FinishResponse, ErrorObjectOwned> {
        self.queue
            .complete(&params.id, params.result, params.error)
            .map_err(to_rpc_error)?;

        Ok(FinishResponse {
            id: params.id,
            done: true,
        })
    }

    /// queue.update.v1
    pub async fn update(&self, params: UpdateRequest) -> Result<UpdateResponse, ErrorObjectOwned> {
        self.queue
            .update_progress(&params.id, params.progress)
            .map_err(to_rpc_error)?;

        let job = self.queue.get(&params.id).map_err(to_rpc_error)?;
        Ok(UpdateResponse {
            id: params.id,
            progress: job.progress,
        })
    }

    /// queue.wait.v1
    pub async fn wait(&self, params: WaitRequest) -> Result<WaitResponse, ErrorObjectOwned> {
        match params.timeout_ms {
            None => {
                let jobs = self
                    .queue
                    .await_all(&params.ids)
                    .await
                    .map_err(to_rpc_error)?;
                Ok(WaitResponse {
                    complete: true,
                    jobs,
                })
            }
            Some(ms) => {
                let finished = self
                    .queue
                    .await_all_timeout(&params.ids, bounded(ms))
                    .await
                    .map_err(to_rpc_error)?;
                match finished {
                    Some(jobs) => Ok(WaitResponse {
                        complete: true,
                        jobs,
                    }),
                    None => Ok(WaitResponse {
                        complete: false,
                        jobs: self.queue.get_all(&params.ids).map_err(to_rpc_error)?,
                    }),
                }
            }
        }
    }

    /// queue.job.v1
    pub async fn job(&self, params: JobRequest) -> Result<Job, ErrorObjectOwned> {
        self.queue.get(&params.id).map_err(to_rpc_error)
    }

    /// queue.report.v1
    pub async fn report(&self) -> Result<QueueReport, ErrorObjectOwned> {
        Ok(self.queue.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use serde_json::json;

    fn handler() -> RpcHandler {
        RpcHandler::new(Arc::new(WorkQueue::new()))
    }

    fn push_req(value: serde_json::Value) -> PushRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_push_rejects_invalid_channel() {
        let h = handler();
        let err = h
            .push(push_req(json!({"method": "m", "channel": "no spaces"})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), code::VALIDATION_ERROR);
        assert_eq!(h.report().await.unwrap().submitted, 0);
    }

    #[tokio::test]
    async fn test_pop_times_out_with_null_job() {
        let h = handler();
        let resp = h
            .pop(PopRequest {
                channels: vec!["idle".into()],
                timeout_ms: Some(10),
            })
            .await
            .unwrap();
        assert!(resp.job.is_none());
        assert_eq!(h.report().await.unwrap().waiting, 0);
    }

    #[tokio::test]
    async fn test_push_pop_finish_wait() {
        let h = handler();
        let pushed = h
            .push(push_req(json!({"method": "m", "channel": "c", "payload": [1]})))
            .await
            .unwrap();

        let popped = h
            .pop(PopRequest {
                channels: vec!["c".into()],
                timeout_ms: Some(10),
            })
            .await
            .unwrap()
            .job
            .unwrap();
        assert_eq!(popped.id, pushed.id);

        h.finish(FinishRequest {
            id: pushed.id.clone(),
            result: Some(json!("ok")),
            error: None,
        })
        .await
        .unwrap();

        let waited = h
            .wait(WaitRequest {
                ids: vec![pushed.id],
                timeout_ms: None,
            })
            .await
            .unwrap();
        assert!(waited.complete);
        assert_eq!(waited.jobs[0].result, Some(json!("ok")));
    }

    #[tokio::test]
    async fn test_wait_timeout_returns_current_views() {
        let h = handler();
        let pushed = h.push(push_req(json!({"method": "m"}))).await.unwrap();

        let waited = h
            .wait(WaitRequest {
                ids: vec![pushed.id],
                timeout_ms: Some(10),
            })
            .await
            .unwrap();
        assert!(!waited.complete);
        assert!(!waited.jobs[0].done);
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let h = handler();
        let err = h
            .finish(FinishRequest {
                id: "ghost".into(),
                result: None,
                error: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), code::NOT_FOUND);

        let err = h.job(JobRequest { id: "ghost".into() }).await.unwrap_err();
        assert_eq!(err.code(), code::NOT_FOUND);
    }
}
