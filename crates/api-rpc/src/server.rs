//! JSON-RPC Server
//!
//! Serves the queue over JSON-RPC 2.0 (HTTP + WebSocket via jsonrpsee).

use crate::handler::RpcHandler;
use crate::types::{FinishRequest, JobRequest, PopRequest, PushRequest, UpdateRequest, WaitRequest};
use jsonrpsee::server::Server;
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use workq_core::WorkQueue;

pub use jsonrpsee::server::ServerHandle;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9531;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 binds an ephemeral port
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, queue: Arc<WorkQueue>) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(queue)),
        }
    }

    /// Start the JSON-RPC server, returning the bound address and its handle
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let mut module = RpcModule::new(());

        // Register methods
        let handler = self.handler.clone();
        module
            .register_async_method("queue.push.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: PushRequest = params.parse()?;
                    handler.push(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.pop.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: PopRequest = params.parse()?;
                    handler.pop(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.finish.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: FinishRequest = params.parse()?;
                    handler.finish(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.update.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: UpdateRequest = params.parse()?;
                    handler.update(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.wait.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: WaitRequest = params.parse()?;
                    handler.wait(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.job.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobRequest = params.parse()?;
                    handler.job(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        // Takes no parameters
        let handler = self.handler.clone();
        module
            .register_async_method("queue.report.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { handler.report().await }
            })
            .map_err(|e| e.to_string())?;

        info!(addr = %local_addr, "JSON-RPC server started");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}
