use deadpool_redis::Pool;
use deadpool_redis::redis::{AsyncCommands, RedisError};

use crate::domain::repository::{Counter, CounterStore, LookupCache};
use crate::error::PortalServiceError;
use crate::infra::memory::{MemoryStore, SystemClock};

#[derive(Clone)]
pub struct RedisStore {
    pub pool: Pool,
}

impl RedisStore {
    async fn conn(&self) -> Result<deadpool_redis::Connection, PortalServiceError> {
        self.pool
            .get()
            .await
            .map_err(|e| PortalServiceError::Internal(e.into()))
    }
}

fn redis_err(e: RedisError) -> PortalServiceError {
    PortalServiceError::Internal(e.into())
}

/// Redis TTL: -2 missing, -1 no expiry.
fn remaining_secs(ttl: i64, fallback: u64) -> u64 {
    if ttl < 0 { fallback } else { ttl as u64 }
}

/// Seconds left for a counter read with `TTL`, and whether the key lacks an
/// expiry and must be given one.
fn window_left(ttl: i64, window_secs: u64) -> (u64, bool) {
    match ttl {
        -1 => (window_secs, true),
        t => (remaining_secs(t, 0), false),
    }
}

impl CounterStore for RedisStore {
    async fn current(
        &self,
        key: &str,
        window_secs: u64,
    ) -> Result<Option<Counter>, PortalServiceError> {
        let mut conn = self.conn().await?;
        let count: Option<u64> = conn.get(key).await.map_err(redis_err)?;
        let Some(count) = count else {
            return Ok(None);
        };
        let ttl: i64 = conn.ttl(key).await.map_err(redis_err)?;
        let (resets_in_secs, needs_expiry) = window_left(ttl, window_secs);
        // A key at the cap is refused before `increment` runs, so a missing
        // expiry has to be repaired on the read path too.
        if needs_expiry {
            let _: bool = conn
                .expire(key, window_secs as i64)
                .await
                .map_err(redis_err)?;
        }
        Ok(Some(Counter {
            count,
            resets_in_secs,
        }))
    }

    async fn increment(&self, key: &str, window_secs: u64) -> Result<Counter, PortalServiceError> {
        let mut conn = self.conn().await?;
        let count: u64 = conn.incr(key, 1u64).await.map_err(redis_err)?;
        let mut ttl: i64 = if count == 1 {
            -1
        } else {
            conn.ttl(key).await.map_err(redis_err)?
        };
        // First hit opens the window. A key left without expiry by a crash
        // between INCR and EXPIRE is repaired here.
        if ttl < 0 {
            let _: bool = conn
                .expire(key, window_secs as i64)
                .await
                .map_err(redis_err)?;
            ttl = window_secs as i64;
        }
        Ok(Counter {
            count,
            resets_in_secs: remaining_secs(ttl, window_secs),
        })
    }
}

impl LookupCache for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PortalServiceError> {
        let mut conn = self.conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(redis_err)?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), PortalServiceError> {
        let mut conn = self.conn().await?;
        let (): () = conn.set_ex(key, value, ttl_secs).await.map_err(redis_err)?;
        Ok(())
    }
}

/// Shared counter and cache backend. Redis when configured, otherwise a
/// process-local store (single instance only).
#[derive(Clone)]
pub enum KvStore {
    Redis(RedisStore),
    Memory(MemoryStore<SystemClock>),
}

impl KvStore {
    pub fn backend(&self) -> &'static str {
        match self {
            KvStore::Redis(_) => "redis",
            KvStore::Memory(_) => "memory",
        }
    }
}

impl CounterStore for KvStore {
    async fn current(
        &self,
        key: &str,
        window_secs: u64,
    ) -> Result<Option<Counter>, PortalServiceError> {
        match self {
            KvStore::Redis(s) => s.current(key, window_secs).await,
            KvStore::Memory(s) => s.current(key, window_secs).await,
        }
    }

    async fn increment(&self, key: &str, window_secs: u64) -> Result<Counter, PortalServiceError> {
        match self {
            KvStore::Redis(s) => s.increment(key, window_secs).await,
            KvStore::Memory(s) => s.increment(key, window_secs).await,
        }
    }
}

impl LookupCache for KvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PortalServiceError> {
        match self {
            KvStore::Redis(s) => LookupCache::get(s, key).await,
            KvStore::Memory(s) => LookupCache::get(s, key).await,
        }
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), PortalServiceError> {
        match self {
            KvStore::Redis(s) => s.put(key, value, ttl_secs).await,
            KvStore::Memory(s) => s.put(key, value, ttl_secs).await,
        }
    }
}
