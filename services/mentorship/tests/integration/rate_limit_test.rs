use portal_mentorship::domain::types::{RATE_LIMIT_WINDOW_SECS, registration_client_key};
use portal_mentorship::error::PortalServiceError;
use portal_mentorship::infra::memory::MemoryStore;
use portal_mentorship::usecase::rate_limit::RateLimiter;

use crate::helpers::ManualClock;

#[tokio::test]
async fn should_pass_five_refuse_sixth_and_reopen_after_window() {
    let clock = ManualClock::new();
    let limiter = RateLimiter::registration(MemoryStore::with_clock(clock.clone()));
    let key = registration_client_key("198.51.100.4", "Mozilla/5.0");

    for call in 1..=5u64 {
        let decision = limiter.check(&key).await.unwrap();
        assert_eq!(decision.remaining, 5 - call);
    }

    clock.advance(20);
    let result = limiter.check(&key).await;
    match result {
        Err(PortalServiceError::RateLimitExceeded { retry_after_secs }) => {
            assert_eq!(retry_after_secs, RATE_LIMIT_WINDOW_SECS - 20);
        }
        other => panic!("expected RateLimitExceeded, got {other:?}"),
    }

    clock.advance(RATE_LIMIT_WINDOW_SECS as i64 - 20);
    let decision = limiter.check(&key).await.unwrap();
    assert_eq!(decision.remaining, 4);
}

#[tokio::test]
async fn should_not_extend_window_with_refused_calls() {
    let clock = ManualClock::new();
    let limiter = RateLimiter::registration(MemoryStore::with_clock(clock.clone()));
    let key = registration_client_key("198.51.100.4", "curl/8.0");

    for _ in 0..5 {
        limiter.check(&key).await.unwrap();
    }
    for _ in 0..10 {
        clock.advance(5);
        assert!(limiter.check(&key).await.is_err());
    }
    clock.advance(10);
    assert!(limiter.check(&key).await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_admit_at_most_five_concurrent_callers() {
    let limiter = RateLimiter::registration(MemoryStore::with_clock(ManualClock::new()));
    let key = registration_client_key("198.51.100.4", "burst");

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let limiter = limiter.clone();
            let key = key.clone();
            tokio::spawn(async move { limiter.check(&key).await.is_ok() })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 5);
}
