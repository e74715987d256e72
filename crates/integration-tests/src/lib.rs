//! Shared helpers for the workq integration tests

use std::sync::Arc;
use workq_api_rpc::{RpcServer, RpcServerConfig};
use workq_core::WorkQueue;

pub use workq_api_rpc::server::ServerHandle;

/// Serve `queue` on an ephemeral localhost port; returns the base URL
pub async fn start_server(queue: Arc<WorkQueue>) -> (String, ServerHandle) {
    let config = RpcServerConfig {
        port: 0,
        ..Default::default()
    };
    let (addr, handle) = RpcServer::new(config, queue)
        .start()
        .await
        .expect("server should start on an ephemeral port");
    (format!("http://{}", addr), handle)
}
