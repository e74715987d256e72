//! Simple SDK Example
//!
//! Pushes a few jobs, serves them as a remote worker, then waits for them.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    cargo run --package workq-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --package workq-sdk --example simple
//!    ```

use serde_json::json;
use std::time::Duration;
use workq_sdk::{PushRequest, WorkqClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = WorkqClient::connect("http://127.0.0.1:9531").await?;

    // 1. Producer side
    let mut ids = Vec::new();
    for (page, priority) in [(1, 5), (2, 1), (3, 3)] {
        let id = client
            .push(
                PushRequest::new("render_page")
                    .channel("render")
                    .priority(priority)
                    .payload(json!({ "page": page })),
            )
            .await?;
        println!("pushed job {} (page {}, priority {})", id, page, priority);
        ids.push(id);
    }

    // 2. Worker side: lowest priority value comes out first
    while let Some(job) = client
        .pop(&["render"], Some(Duration::from_millis(500)))
        .await?
    {
        println!("working on job {} payload={}", job.id, job.payload);
        let mut progress = serde_json::Map::new();
        progress.insert("status".into(), json!("rendering"));
        client.update(&job.id, progress).await?;
        client
            .finish(&job.id, Some(json!({ "pages": 1 })), None)
            .await?;
    }

    // 3. Producer waits for everything it pushed
    let waited = client.wait(&ids, Some(Duration::from_secs(5))).await?;
    for job in waited.jobs {
        println!("job {} done={} result={:?}", job.id, job.done, job.result);
    }

    let report = client.report().await?;
    println!("submitted={} waiting={}", report.submitted, report.waiting);

    Ok(())
}
