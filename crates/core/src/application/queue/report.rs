// Queue diagnostics

use crate::domain::{ChannelName, Serial};
use serde::{Deserialize, Serialize};

/// Pending depth of one non-empty channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDepth {
    pub channel: ChannelName,
    pub pending: usize,
}

/// Observational snapshot, no consistency guarantee across fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueReport {
    /// Jobs ever created (duplicate submissions excluded)
    pub submitted: Serial,
    /// Consumers currently blocked in `take`
    pub waiting: usize,
    /// Non-empty channels, sorted by name
    pub busy_channels: Vec<ChannelDepth>,
}

impl QueueReport {
    pub fn is_idle(&self) -> bool {
        self.busy_channels.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.busy_channels.iter().map(|c| c.pending).sum()
    }
}
