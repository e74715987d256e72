// Waiter Registry - blocked consumers, matched in registration order

use super::record::JobRecord;
use crate::domain::ChannelName;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Set of channels a consumer is willing to serve. Empty means any channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interest(BTreeSet<ChannelName>);

impl Interest {
    /// Wildcard: every channel, including ones not created yet
    pub fn any() -> Self {
        Self::default()
    }

    pub fn of<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(channels.into_iter().map(Into::into).collect())
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, channel: &str) -> bool {
        self.is_wildcard() || self.0.contains(channel)
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl std::fmt::Display for Interest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_wildcard() {
            return f.write_str("*");
        }
        let names: Vec<&str> = self.channels().collect();
        f.write_str(&names.join(","))
    }
}

/// Registration handle, used to deregister a consumer that gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct WaiterId(u64);

#[derive(Debug)]
struct Waiter {
    id: WaiterId,
    interest: Interest,
    slot: oneshot::Sender<Arc<JobRecord>>,
}

#[derive(Debug, Default)]
pub(crate) struct WaiterRegistry {
    waiters: VecDeque<Waiter>,
    next_id: u64,
}

impl WaiterRegistry {
    /// Append a waiter and return the receiving half of its delivery slot
    pub(crate) fn register(
        &mut self,
        interest: Interest,
    ) -> (WaiterId, oneshot::Receiver<Arc<JobRecord>>) {
        self.next_id += 1;
        let id = WaiterId(self.next_id);
        let (slot, rx) = oneshot::channel();
        self.waiters.push_back(Waiter { id, interest, slot });
        (id, rx)
    }

    /// Hand `record` to the first waiter whose interest covers its channel.
    ///
    /// The waiter is removed before its slot is filled. Returns the record
    /// back when nobody is waiting for it.
    pub(crate) fn deliver(&mut self, mut record: Arc<JobRecord>) -> Result<WaiterId, Arc<JobRecord>> {
        while let Some(pos) = self
            .waiters
            .iter()
            .position(|w| w.interest.matches(record.channel()))
        {
            let Some(waiter) = self.waiters.remove(pos) else {
                break;
            };
            match waiter.slot.send(record) {
                Ok(()) => return Ok(waiter.id),
                // Receiver already gone; try the next match.
                Err(returned) => record = returned,
            }
        }
        Err(record)
    }

    /// Drop a still-registered waiter. False if it was already served.
    pub(crate) fn remove(&mut self, id: WaiterId) -> bool {
        match self.waiters.iter().position(|w| w.id == id) {
            Some(pos) => {
                self.waiters.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.waiters.len()
    }
}
