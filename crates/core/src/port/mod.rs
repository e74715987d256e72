// Port Layer - Interfaces for job execution

pub mod job_executor;

// Re-exports
pub use job_executor::{ExecutionError, JobExecutor, ProgressReporter};
