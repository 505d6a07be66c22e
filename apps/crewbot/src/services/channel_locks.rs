//! Per-channel serialization of coordinator operations.
//!
//! A coordinator operation spans a transaction plus voice and panel calls.
//! Two of them on the same channel must not interleave, whether they come
//! from one coordinator or several.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::ids::ChannelId;

#[derive(Debug, Clone, Default)]
pub struct ChannelLocks {
    locks: Arc<DashMap<ChannelId, Arc<Mutex<()>>>>,
}

impl ChannelLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `channel_id`; released when the guard drops.
    pub async fn acquire(&self, channel_id: ChannelId) -> OwnedMutexGuard<()> {
        // Clone out of the map so no shard lock is held across the await.
        let lock = self.locks.entry(channel_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Drop the channel's entry once nobody holds or waits on it.
    pub fn prune(&self, channel_id: ChannelId) {
        self.locks
            .remove_if(&channel_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
