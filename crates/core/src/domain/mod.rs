// Domain Layer - Jobs, ordering and completion signalling

pub mod error;
pub mod job;
pub mod signal;
pub mod submit;

// Re-exports
pub use error::DomainError;
pub use job::{
    ChannelName, Job, JobId, JobMethod, JobPayload, OrderingKey, Priority, Progress, Serial,
    DEFAULT_CHANNEL,
};
pub use signal::CompletionSignal;
pub use submit::SubmitRequest;
