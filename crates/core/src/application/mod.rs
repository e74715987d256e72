// Application Layer - Queue orchestration and the consumer loop

pub mod queue;
pub mod worker;

// Re-exports
pub use queue::{Interest, QueueReport, WorkQueue};
pub use worker::{shutdown_channel, ShutdownSender, ShutdownToken, Worker};
