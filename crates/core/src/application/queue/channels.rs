// Channel Store - one min-priority queue per channel name

use super::record::JobRecord;
use super::waiters::Interest;
use crate::domain::{ChannelName, OrderingKey};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

/// Heap entry. `BinaryHeap` is a max-heap, so the comparison is reversed to
/// pop the smallest (priority, serial) first.
#[derive(Debug)]
struct Queued {
    key: OrderingKey,
    record: Arc<JobRecord>,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key.cmp(&self.key)
    }
}

/// Per-channel priority queues, created lazily on first push
#[derive(Debug, Default)]
pub(crate) struct ChannelStore {
    queues: HashMap<ChannelName, BinaryHeap<Queued>>,
}

impl ChannelStore {
    pub(crate) fn push(&mut self, record: Arc<JobRecord>) {
        let key = record.key();
        self.queues
            .entry(record.channel().to_string())
            .or_default()
            .push(Queued { key, record });
    }

    /// Remove and return the best head among the channels `interest` covers.
    ///
    /// A wildcard interest considers every channel currently known.
    pub(crate) fn pop_best(&mut self, interest: &Interest) -> Option<Arc<JobRecord>> {
        let best = if interest.is_wildcard() {
            self.queues
                .iter()
                .filter_map(|(name, heap)| heap.peek().map(|head| (head.key, name)))
                .min_by_key(|(key, _)| *key)
                .map(|(_, name)| name.clone())
        } else {
            interest
                .channels()
                .filter_map(|name| {
                    self.queues
                        .get(name)
                        .and_then(|heap| heap.peek())
                        .map(|head| (head.key, name))
                })
                .min_by_key(|(key, _)| *key)
                .map(|(_, name)| name.to_string())
        }?;

        self.queues
            .get_mut(&best)
            .and_then(|heap| heap.pop())
            .map(|queued| queued.record)
    }

    pub(crate) fn depth(&self, channel: &str) -> usize {
        self.queues.get(channel).map_or(0, |heap| heap.len())
    }

    /// Channels with pending jobs, sorted by name
    pub(crate) fn busy_channels(&self) -> Vec<(ChannelName, usize)> {
        let mut busy: Vec<_> = self
            .queues
            .iter()
            .filter(|(_, heap)| !heap.is_empty())
            .map(|(name, heap)| (name.clone(), heap.len()))
            .collect();
        busy.sort();
        busy
    }

    pub(crate) fn pending(&self) -> usize {
        self.queues.values().map(|heap| heap.len()).sum()
    }
}
