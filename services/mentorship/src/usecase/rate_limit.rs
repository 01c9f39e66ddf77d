use crate::domain::repository::CounterStore;
use crate::domain::types::{RATE_LIMIT_MAX_ATTEMPTS, RATE_LIMIT_WINDOW_SECS};
use crate::error::PortalServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub remaining: u64,
    pub resets_in_secs: u64,
}

/// Fixed-window limiter over a [`CounterStore`].
#[derive(Clone)]
pub struct RateLimiter<S: CounterStore> {
    pub store: S,
    pub max_attempts: u64,
    pub window_secs: u64,
}

impl<S: CounterStore> RateLimiter<S> {
    /// 5 attempts per 60 s, the registration budget.
    pub fn registration(store: S) -> Self {
        Self {
            store,
            max_attempts: RATE_LIMIT_MAX_ATTEMPTS,
            window_secs: RATE_LIMIT_WINDOW_SECS,
        }
    }

    /// Refuse without incrementing once the budget is spent; otherwise count
    /// this call against the window.
    pub async fn check(&self, key: &str) -> Result<RateDecision, PortalServiceError> {
        if let Some(counter) = self.store.current(key, self.window_secs).await? {
            if counter.count >= self.max_attempts {
                return Err(PortalServiceError::RateLimitExceeded {
                    retry_after_secs: counter.resets_in_secs.max(1),
                });
            }
        }

        let counter = self.store.increment(key, self.window_secs).await?;
        // Lost a race with concurrent callers past the read above.
        if counter.count > self.max_attempts {
            return Err(PortalServiceError::RateLimitExceeded {
                retry_after_secs: counter.resets_in_secs.max(1),
            });
        }

        Ok(RateDecision {
            remaining: self.max_attempts - counter.count,
            resets_in_secs: counter.resets_in_secs,
        })
    }
}
