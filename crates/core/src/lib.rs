// workq Core - Queue Logic & Ports
// NO infrastructure dependencies (hexagonal layout)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::queue::{Interest, QueueReport, WorkQueue};
pub use domain::{Job, JobId, SubmitRequest};
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
