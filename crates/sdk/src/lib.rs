//! workq SDK - Rust Client Library
//!
//! Talks to a `workqd` daemon over JSON-RPC. Producers push jobs and wait for
//! them, remote workers pop jobs and report progress and outcomes.
//!
//! # Example
//!
//! ```no_run
//! use workq_sdk::{PushRequest, WorkqClient};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WorkqClient::connect("http://127.0.0.1:9531").await?;
//!
//!     let id = client
//!         .push(PushRequest::new("render").channel("pdf").payload(json!({"book": 7})))
//!         .await?;
//!
//!     let jobs = client.wait(&[id], None).await?;
//!     println!("result: {:?}", jobs.jobs[0].result);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::WorkqClient;
pub use error::{Result, SdkError};
pub use types::{ChannelDepth, Job, PushRequest, QueueReport, WaitResponse};
