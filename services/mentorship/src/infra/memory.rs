use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::repository::{Clock, Counter, CounterStore, LookupCache};
use crate::error::PortalServiceError;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

impl<T> Slot<T> {
    fn live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    fn resets_in_secs(&self, now: DateTime<Utc>) -> u64 {
        let ms = (self.expires_at - now).num_milliseconds().max(0) as u64;
        ms.div_ceil(1000)
    }
}

/// Process-local counters and cache entries with expiry. Reads ignore expired
/// entries; [`spawn_purger`] removes them.
#[derive(Clone)]
pub struct MemoryStore<C: Clock + Clone> {
    counters: Arc<DashMap<String, Slot<u64>>>,
    values: Arc<DashMap<String, Slot<String>>>,
    clock: C,
}

impl MemoryStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone> MemoryStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            counters: Arc::new(DashMap::new()),
            values: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.counters.len() + self.values.len();
        self.counters.retain(|_, slot| slot.live_at(now));
        self.values.retain(|_, slot| slot.live_at(now));
        before.saturating_sub(self.counters.len() + self.values.len())
    }
}

/// Purge `store` every `period` until the returned task is aborted.
pub fn spawn_purger<C>(store: MemoryStore<C>, period: Duration) -> JoinHandle<()>
where
    C: Clock + Clone + 'static,
{
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(period);
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticks.tick().await;
            let removed = store.purge_expired();
            if removed > 0 {
                debug!(removed, "purged expired in-process entries");
            }
        }
    })
}

impl<C: Clock + Clone> CounterStore for MemoryStore<C> {
    // Every slot is created with an expiry, so there is nothing to repair.
    async fn current(
        &self,
        key: &str,
        _window_secs: u64,
    ) -> Result<Option<Counter>, PortalServiceError> {
        let now = self.clock.now();
        let counter = self.counters.get(key).and_then(|slot| {
            slot.live_at(now).then(|| Counter {
                count: slot.value,
                resets_in_secs: slot.resets_in_secs(now),
            })
        });
        Ok(counter)
    }

    async fn increment(&self, key: &str, window_secs: u64) -> Result<Counter, PortalServiceError> {
        let now = self.clock.now();
        let window = TimeDelta::seconds(window_secs as i64);
        // The entry guard holds the shard lock, so read-modify-write is atomic.
        let mut slot = self.counters.entry(key.to_owned()).or_insert(Slot {
            value: 0,
            expires_at: now + window,
        });
        if !slot.live_at(now) {
            slot.value = 0;
            slot.expires_at = now + window;
        }
        slot.value += 1;
        Ok(Counter {
            count: slot.value,
            resets_in_secs: slot.resets_in_secs(now),
        })
    }
}

impl<C: Clock + Clone> LookupCache for MemoryStore<C> {
    async fn get(&self, key: &str) -> Result<Option<String>, PortalServiceError> {
        let now = self.clock.now();
        Ok(self
            .values
            .get(key)
            .filter(|slot| slot.live_at(now))
            .map(|slot| slot.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), PortalServiceError> {
        let expires_at = self.clock.now() + TimeDelta::seconds(ttl_secs as i64);
        self.values.insert(
            key.to_owned(),
            Slot {
                value: value.to_owned(),
                expires_at,
            },
        );
        Ok(())
    }
}
