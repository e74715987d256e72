// Worker and server constants (no magic values)
use std::time::Duration;

/// Upper bound a remote `pop` waits server-side before answering "no job".
/// Kept below the SDK's HTTP request timeout.
pub const DEFAULT_POP_TIMEOUT: Duration = Duration::from_secs(25);

/// Ceiling on client-requested pop/wait timeouts
pub const MAX_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default interval between queue reports in the daemon (60s)
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(60);
