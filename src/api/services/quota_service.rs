//! Per-user generation quota.
//!
//! The quota is a collaborator consulted once per request: it answers whether
//! `key` may make another request under a `QuotaPolicy`. Two backends exist, an
//! in-process rolling log and a Postgres event counter shared between
//! instances. Both count exactly: an event counts while it is younger than
//! the window.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_MAX_REQUESTS: u32 = 50;
pub const DEFAULT_WINDOW_MINUTES: u32 = 60;

/// At most `max_requests` per rolling `window_minutes`, per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuotaPolicy {
    pub max_requests: u32,
    pub window_minutes: u32,
}

impl QuotaPolicy {
    pub fn new(max_requests: u32, window_minutes: u32) -> Self {
        Self {
            max_requests,
            window_minutes,
        }
    }

    /// Read `QUOTA_MAX_REQUESTS` and `QUOTA_WINDOW_MINUTES`, falling back to
    /// 50 per 60 minutes.
    pub fn from_env() -> Self {
        let read = |name: &str, default: u32| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };
        Self {
            max_requests: read("QUOTA_MAX_REQUESTS", DEFAULT_MAX_REQUESTS),
            window_minutes: read("QUOTA_WINDOW_MINUTES", DEFAULT_WINDOW_MINUTES),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(u64::from(self.window_minutes) * 60)
    }
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_MINUTES)
    }
}

/// The quota backend could not answer.
#[derive(Debug, Clone, Error)]
pub enum QuotaError {
    #[error("Quota service unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait QuotaGate: Send + Sync {
    /// Record one request for `key` and report whether it is within `policy`.
    async fn try_acquire(&self, key: &str, policy: &QuotaPolicy) -> Result<bool, QuotaError>;
}

/// Distinct keys tracked before idle ones are swept out.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 10_000;

/// In-process rolling-window counter.
///
/// Keeps the admission instants of each `(policy, key)` pair for one window,
/// so at most `max_requests` are admitted in any `window_minutes` span. Pairs
/// whose log has emptied are dropped once the map grows past the sweep
/// threshold.
pub struct InMemoryQuotaGate {
    state: Mutex<GateState>,
    sweep_threshold: usize,
}

struct GateState {
    logs: HashMap<(QuotaPolicy, String), VecDeque<Instant>>,
    next_sweep: usize,
}

impl Default for InMemoryQuotaGate {
    fn default() -> Self {
        Self::with_sweep_threshold(DEFAULT_SWEEP_THRESHOLD)
    }
}

impl InMemoryQuotaGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sweep_threshold(sweep_threshold: usize) -> Self {
        let sweep_threshold = sweep_threshold.max(1);
        Self {
            state: Mutex::new(GateState {
                logs: HashMap::new(),
                next_sweep: sweep_threshold,
            }),
            sweep_threshold,
        }
    }

    /// Number of `(policy, key)` pairs currently held.
    pub fn tracked_keys(&self) -> usize {
        self.state.lock().map(|state| state.logs.len()).unwrap_or(0)
    }

    /// Record one request for `key` at `now`.
    pub fn acquire_at(
        &self,
        key: &str,
        policy: &QuotaPolicy,
        now: Instant,
    ) -> Result<bool, QuotaError> {
        if policy.max_requests == 0 {
            return Ok(false);
        }
        let window = policy.window();
        let mut state = self
            .state
            .lock()
            .map_err(|_| QuotaError::Unavailable("quota log poisoned".to_string()))?;

        let log = state
            .logs
            .entry((*policy, key.to_string()))
            .or_default();
        prune(log, now, window);

        let allowed = log.len() < policy.max_requests as usize;
        if allowed {
            log.push_back(now);
        }

        if state.logs.len() > state.next_sweep {
            state.sweep(now, self.sweep_threshold);
        }
        Ok(allowed)
    }
}

impl GateState {
    fn sweep(&mut self, now: Instant, threshold: usize) {
        let before = self.logs.len();
        self.logs.retain(|(policy, _), log| {
            prune(log, now, policy.window());
            !log.is_empty()
        });
        // Live keys alone may exceed the threshold; wait for the map to double
        self.next_sweep = threshold.max(self.logs.len() * 2);
        debug!(
            before,
            after = self.logs.len(),
            "Swept idle quota keys"
        );
    }
}

/// Drop instants that have left the window ending at `now`.
fn prune(log: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while log
        .front()
        .is_some_and(|admitted| now.saturating_duration_since(*admitted) >= window)
    {
        log.pop_front();
    }
}

#[async_trait]
impl QuotaGate for InMemoryQuotaGate {
    async fn try_acquire(&self, key: &str, policy: &QuotaPolicy) -> Result<bool, QuotaError> {
        self.acquire_at(key, policy, Instant::now())
    }
}

/// Counter backed by the `rate_limit_events` table.
///
/// Each call runs in one transaction holding an advisory lock on the key, so
/// concurrent requests for the same user are counted one after another.
pub struct PostgresQuotaGate {
    pool: PgPool,
}

impl PostgresQuotaGate {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unavailable(e: sqlx::Error) -> QuotaError {
    QuotaError::Unavailable(e.to_string())
}

#[async_trait]
impl QuotaGate for PostgresQuotaGate {
    async fn try_acquire(&self, key: &str, policy: &QuotaPolicy) -> Result<bool, QuotaError> {
        let window_minutes = i32::try_from(policy.window_minutes).unwrap_or(i32::MAX);
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(key)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;

        sqlx::query(
            r#"
            DELETE FROM rate_limit_events
            WHERE user_key = $1 AND created_at <= NOW() - make_interval(mins => $2)
            "#,
        )
        .bind(key)
        .bind(window_minutes)
        .execute(&mut *tx)
        .await
        .map_err(unavailable)?;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM rate_limit_events
            WHERE user_key = $1 AND created_at > NOW() - make_interval(mins => $2)
            "#,
        )
        .bind(key)
        .bind(window_minutes)
        .fetch_one(&mut *tx)
        .await
        .map_err(unavailable)?;

        if count >= i64::from(policy.max_requests) {
            tx.commit().await.map_err(unavailable)?;
            return Ok(false);
        }

        sqlx::query("INSERT INTO rate_limit_events (user_key, created_at) VALUES ($1, NOW())")
            .bind(key)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;

        tx.commit().await.map_err(unavailable)?;
        Ok(true)
    }
}
