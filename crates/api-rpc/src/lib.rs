//! JSON-RPC API Layer
//!
//! Exposes a [`WorkQueue`](workq_core::WorkQueue) as a JSON-RPC 2.0 server so
//! producers and workers in other processes can share one queue.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
