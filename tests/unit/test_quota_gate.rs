//! In-process quota gate and policy tests.

use diagram_gen_api::services::{InMemoryQuotaGate, QuotaGate, QuotaPolicy};
use serial_test::serial;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_allows_up_to_limit_then_denies() {
    let gate = InMemoryQuotaGate::new();
    let policy = QuotaPolicy::new(3, 60);

    for attempt in 1..=3 {
        assert!(
            gate.try_acquire("user-1", &policy).await.unwrap(),
            "attempt {attempt} should be allowed"
        );
    }
    assert!(!gate.try_acquire("user-1", &policy).await.unwrap());
}

#[tokio::test]
async fn test_default_policy_allows_fifty() {
    let gate = InMemoryQuotaGate::new();
    let policy = QuotaPolicy::default();

    for _ in 0..50 {
        assert!(gate.try_acquire("user-1", &policy).await.unwrap());
    }
    assert!(!gate.try_acquire("user-1", &policy).await.unwrap());
}

#[tokio::test]
async fn test_keys_are_independent() {
    let gate = InMemoryQuotaGate::new();
    let policy = QuotaPolicy::new(1, 60);

    assert!(gate.try_acquire("alice", &policy).await.unwrap());
    assert!(!gate.try_acquire("alice", &policy).await.unwrap());
    assert!(gate.try_acquire("bob", &policy).await.unwrap());
}

#[tokio::test]
async fn test_policies_are_tracked_separately() {
    let gate = InMemoryQuotaGate::new();
    let strict = QuotaPolicy::new(1, 60);
    let relaxed = QuotaPolicy::new(5, 60);

    assert!(gate.try_acquire("alice", &strict).await.unwrap());
    assert!(!gate.try_acquire("alice", &strict).await.unwrap());
    assert!(gate.try_acquire("alice", &relaxed).await.unwrap());
}

#[tokio::test]
async fn test_zero_limit_denies_everything() {
    let gate = InMemoryQuotaGate::new();
    let policy = QuotaPolicy::new(0, 60);
    assert!(!gate.try_acquire("alice", &policy).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_never_exceed_limit() {
    let gate = Arc::new(InMemoryQuotaGate::new());
    let policy = QuotaPolicy::new(10, 60);

    let handles: Vec<_> = (0..40)
        .map(|_| {
            let gate = gate.clone();
            tokio::spawn(async move { gate.try_acquire("shared", &policy).await.unwrap() })
        })
        .collect();

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 10);
}

#[test]
fn test_drained_quota_stays_denied_until_window_passes() {
    let gate = InMemoryQuotaGate::new();
    let policy = QuotaPolicy::new(60, 1);
    let start = Instant::now();

    for _ in 0..60 {
        assert!(gate.acquire_at("alice", &policy, start).unwrap());
    }
    assert!(!gate.acquire_at("alice", &policy, start).unwrap());

    // A refill-rate limiter would hand back three slots here
    let later = start + Duration::from_millis(3_100);
    for _ in 0..5 {
        assert!(!gate.acquire_at("alice", &policy, later).unwrap());
    }
    assert!(
        !gate
            .acquire_at("alice", &policy, start + Duration::from_secs(59))
            .unwrap()
    );

    let next_window = start + Duration::from_secs(60);
    for _ in 0..60 {
        assert!(gate.acquire_at("alice", &policy, next_window).unwrap());
    }
    assert!(!gate.acquire_at("alice", &policy, next_window).unwrap());
}

#[test]
fn test_window_rolls_per_request() {
    let gate = InMemoryQuotaGate::new();
    let policy = QuotaPolicy::new(2, 1);
    let start = Instant::now();

    assert!(gate.acquire_at("alice", &policy, start).unwrap());
    assert!(
        gate.acquire_at("alice", &policy, start + Duration::from_secs(30))
            .unwrap()
    );
    assert!(
        !gate
            .acquire_at("alice", &policy, start + Duration::from_secs(45))
            .unwrap()
    );
    // Only the first request has aged out
    assert!(
        gate.acquire_at("alice", &policy, start + Duration::from_secs(60))
            .unwrap()
    );
    assert!(
        !gate
            .acquire_at("alice", &policy, start + Duration::from_secs(61))
            .unwrap()
    );
}

#[tokio::test]
async fn test_drained_quota_denies_after_short_wait() {
    let gate = InMemoryQuotaGate::new();
    let policy = QuotaPolicy::new(60, 1);

    for _ in 0..60 {
        assert!(gate.try_acquire("alice", &policy).await.unwrap());
    }
    tokio::time::sleep(Duration::from_millis(1_100)).await;

    let mut allowed = 0;
    for _ in 0..5 {
        if gate.try_acquire("alice", &policy).await.unwrap() {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 0);
}

#[test]
fn test_idle_keys_are_swept() {
    let gate = InMemoryQuotaGate::with_sweep_threshold(4);
    let policy = QuotaPolicy::new(1, 1);
    let start = Instant::now();

    for n in 0..10 {
        assert!(gate.acquire_at(&format!("user-{n}"), &policy, start).unwrap());
    }
    assert_eq!(gate.tracked_keys(), 10);

    let later = start + Duration::from_secs(61);
    assert!(gate.acquire_at("newcomer", &policy, later).unwrap());
    assert_eq!(gate.tracked_keys(), 1);
}

#[test]
fn test_live_keys_survive_sweep() {
    let gate = InMemoryQuotaGate::with_sweep_threshold(2);
    let policy = QuotaPolicy::new(1, 60);
    let start = Instant::now();

    for n in 0..5 {
        assert!(gate.acquire_at(&format!("user-{n}"), &policy, start).unwrap());
    }
    assert_eq!(gate.tracked_keys(), 5);
    for n in 0..5 {
        assert!(!gate.acquire_at(&format!("user-{n}"), &policy, start).unwrap());
    }
}

#[test]
fn test_default_policy_values() {
    let policy = QuotaPolicy::default();
    assert_eq!(policy.max_requests, 50);
    assert_eq!(policy.window_minutes, 60);
    assert_eq!(policy.window().as_secs(), 3600);
}

#[test]
#[serial]
fn test_policy_from_env() {
    unsafe {
        std::env::set_var("QUOTA_MAX_REQUESTS", "5");
        std::env::set_var("QUOTA_WINDOW_MINUTES", "10");
    }
    let policy = QuotaPolicy::from_env();
    unsafe {
        std::env::remove_var("QUOTA_MAX_REQUESTS");
        std::env::remove_var("QUOTA_WINDOW_MINUTES");
    }

    assert_eq!(policy, QuotaPolicy::new(5, 10));
}

#[test]
#[serial]
fn test_policy_from_env_ignores_invalid_values() {
    unsafe {
        std::env::set_var("QUOTA_MAX_REQUESTS", "lots");
        std::env::set_var("QUOTA_WINDOW_MINUTES", "0");
    }
    let policy = QuotaPolicy::from_env();
    unsafe {
        std::env::remove_var("QUOTA_MAX_REQUESTS");
        std::env::remove_var("QUOTA_WINDOW_MINUTES");
    }

    assert_eq!(policy, QuotaPolicy::default());
}
