//! Fixed-window rate limiting for login and API traffic.
//!
//! Counters are kept per identifier (`login:<ip>`, `api:<ip>`) in a pluggable
//! [`RateLimitStore`]. The default [`MemoryRateLimitStore`] is process-local:
//! restarting the process resets it and separate instances do not share counts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How often expired entries are swept from the in-memory store.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Longest window a policy may use: one year.
pub const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub window: Duration,
    pub max_requests: u32,
}

impl RateLimitPolicy {
    /// Windows longer than [`MAX_WINDOW_SECS`] are clamped to it.
    #[must_use]
    pub const fn new(window: Duration, max_requests: u32) -> Self {
        let window = if window.as_secs() >= MAX_WINDOW_SECS {
            Duration::from_secs(MAX_WINDOW_SECS)
        } else {
            window
        };
        Self {
            window,
            max_requests,
        }
    }

    /// Five login attempts per 15 minutes.
    #[must_use]
    pub const fn login() -> Self {
        Self::new(Duration::from_secs(15 * 60), 5)
    }

    /// Sixty requests per minute.
    #[must_use]
    pub const fn api() -> Self {
        Self::new(Duration::from_secs(60), 60)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitOutcome {
    pub success: bool,
    pub remaining: u32,
    pub reset_at: Instant,
}

impl RateLimitOutcome {
    /// Whole seconds until the window resets, rounded up, for `Retry-After`.
    #[must_use]
    pub fn retry_after_secs(&self, now: Instant) -> u64 {
        let left = self.reset_at.saturating_duration_since(now);
        let secs = left.as_secs();
        if left.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Counter storage behind the limiter.
pub trait RateLimitStore: Send + Sync {
    /// Record one attempt for `key` at `now` and report whether it is allowed.
    fn hit(&self, key: &str, policy: &RateLimitPolicy, now: Instant) -> RateLimitOutcome;

    /// Drop entries whose window has ended. Returns how many were removed.
    fn sweep(&self, now: Instant) -> usize;
}

#[derive(Clone, Copy, Debug)]
struct RateLimitEntry {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl MemoryRateLimitStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    // A panic while holding the lock leaves counters consistent, so keep going.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    fn hit(&self, key: &str, policy: &RateLimitPolicy, now: Instant) -> RateLimitOutcome {
        let mut entries = self.entries();

        match entries.get_mut(key) {
            Some(entry) if now < entry.reset_at => {
                if entry.count >= policy.max_requests {
                    return RateLimitOutcome {
                        success: false,
                        remaining: 0,
                        reset_at: entry.reset_at,
                    };
                }
                entry.count += 1;
                RateLimitOutcome {
                    success: true,
                    remaining: policy.max_requests - entry.count,
                    reset_at: entry.reset_at,
                }
            }
            _ => {
                let entry = RateLimitEntry {
                    count: 1,
                    reset_at: window_end(now, policy.window),
                };
                entries.insert(key.to_string(), entry);
                RateLimitOutcome {
                    success: policy.max_requests >= 1,
                    remaining: policy.max_requests.saturating_sub(1),
                    reset_at: entry.reset_at,
                }
            }
        }
    }

    fn sweep(&self, now: Instant) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| now < entry.reset_at);
        before - entries.len()
    }
}

// The fields are public, so an unclamped window can still reach the store.
fn window_end(now: Instant, window: Duration) -> Instant {
    now.checked_add(window)
        .or_else(|| now.checked_add(Duration::from_secs(MAX_WINDOW_SECS)))
        .unwrap_or(now)
}

/// A policy bound to a store and a key namespace.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    policy: RateLimitPolicy,
    scope: &'static str,
}

impl RateLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>, policy: RateLimitPolicy, scope: &'static str) -> Self {
        Self {
            store,
            policy,
            scope,
        }
    }

    /// Count an attempt from `client` (an IP string or `"unknown"`).
    #[must_use]
    pub fn check(&self, client: &str) -> RateLimitOutcome {
        self.check_at(client, Instant::now())
    }

    #[must_use]
    pub fn check_at(&self, client: &str, now: Instant) -> RateLimitOutcome {
        let key = format!("{}:{client}", self.scope);
        let outcome = self.store.hit(&key, &self.policy, now);
        if outcome.success {
            debug!(key = %key, remaining = outcome.remaining, "rate limit check passed");
        } else {
            warn!(key = %key, "rate limit exceeded");
        }
        outcome
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("scope", &self.scope)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Periodically remove expired entries so the store stays bounded.
pub fn spawn_sweeper(store: Arc<dyn RateLimitStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.sweep(Instant::now());
            if removed > 0 {
                debug!(removed, "swept expired rate limit entries");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_limiter() -> (Arc<MemoryRateLimitStore>, RateLimiter) {
        let store = Arc::new(MemoryRateLimitStore::new());
        let limiter = RateLimiter::new(store.clone(), RateLimitPolicy::login(), "login");
        (store, limiter)
    }

    #[test]
    fn allows_up_to_max_then_rejects() {
        let (_store, limiter) = login_limiter();
        let t0 = Instant::now();

        for expected_remaining in (0..5).rev() {
            let outcome = limiter.check_at("1.2.3.4", t0);
            assert!(outcome.success);
            assert_eq!(outcome.remaining, expected_remaining);
        }

        let sixth = limiter.check_at("1.2.3.4", t0);
        assert!(!sixth.success);
        assert_eq!(sixth.remaining, 0);
        assert_eq!(sixth.reset_at, t0 + Duration::from_millis(900_000));
    }

    #[test]
    fn window_expiry_starts_fresh() {
        let (_store, limiter) = login_limiter();
        let t0 = Instant::now();
        for _ in 0..6 {
            let _ = limiter.check_at("1.2.3.4", t0);
        }
        assert!(!limiter.check_at("1.2.3.4", t0 + Duration::from_secs(899)).success);

        let after = t0 + Duration::from_secs(900);
        let outcome = limiter.check_at("1.2.3.4", after);
        assert!(outcome.success);
        assert_eq!(outcome.remaining, 4);
        assert_eq!(outcome.reset_at, after + Duration::from_secs(900));
    }

    #[test]
    fn clients_are_counted_separately() {
        let (_store, limiter) = login_limiter();
        let t0 = Instant::now();
        for _ in 0..5 {
            assert!(limiter.check_at("1.2.3.4", t0).success);
        }
        assert!(!limiter.check_at("1.2.3.4", t0).success);
        assert!(limiter.check_at("5.6.7.8", t0).success);
        assert!(limiter.check_at("unknown", t0).success);
    }

    #[test]
    fn scopes_do_not_share_counters() {
        let store: Arc<dyn RateLimitStore> = Arc::new(MemoryRateLimitStore::new());
        let login = RateLimiter::new(store.clone(), RateLimitPolicy::new(Duration::from_secs(60), 1), "login");
        let api = RateLimiter::new(store, RateLimitPolicy::new(Duration::from_secs(60), 1), "api");
        let t0 = Instant::now();
        assert!(login.check_at("1.2.3.4", t0).success);
        assert!(!login.check_at("1.2.3.4", t0).success);
        assert!(api.check_at("1.2.3.4", t0).success);
    }

    #[test]
    fn rejected_attempts_do_not_extend_window() {
        let (_store, limiter) = login_limiter();
        let t0 = Instant::now();
        for _ in 0..5 {
            let _ = limiter.check_at("1.2.3.4", t0);
        }
        let later = limiter.check_at("1.2.3.4", t0 + Duration::from_secs(600));
        assert!(!later.success);
        assert_eq!(later.reset_at, t0 + Duration::from_secs(900));
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let (store, limiter) = login_limiter();
        let t0 = Instant::now();
        let _ = limiter.check_at("1.2.3.4", t0);
        let _ = limiter.check_at("5.6.7.8", t0 + Duration::from_secs(300));
        assert_eq!(store.len(), 2);

        assert_eq!(store.sweep(t0 + Duration::from_secs(899)), 0);
        assert_eq!(store.sweep(t0 + Duration::from_secs(900)), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.sweep(t0 + Duration::from_secs(1200)), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn retry_after_rounds_up() {
        let now = Instant::now();
        let outcome = RateLimitOutcome {
            success: false,
            remaining: 0,
            reset_at: now + Duration::from_millis(1500),
        };
        assert_eq!(outcome.retry_after_secs(now), 2);
        assert_eq!(outcome.retry_after_secs(now + Duration::from_secs(5)), 0);
    }

    #[test]
    fn declared_policies() {
        assert_eq!(RateLimitPolicy::login().max_requests, 5);
        assert_eq!(RateLimitPolicy::login().window, Duration::from_secs(900));
        assert_eq!(RateLimitPolicy::api().max_requests, 60);
        assert_eq!(RateLimitPolicy::api().window, Duration::from_secs(60));
    }

    #[test]
    fn huge_window_is_clamped_instead_of_overflowing() {
        let policy = RateLimitPolicy::new(Duration::from_secs(u64::MAX), 5);
        assert_eq!(policy.window, Duration::from_secs(MAX_WINDOW_SECS));

        let store = MemoryRateLimitStore::new();
        let now = Instant::now();
        let outcome = store.hit("login:1.2.3.4", &policy, now);
        assert!(outcome.success);
        assert_eq!(outcome.reset_at, now + Duration::from_secs(MAX_WINDOW_SECS));
    }

    #[test]
    fn unclamped_window_does_not_panic() {
        let policy = RateLimitPolicy {
            window: Duration::MAX,
            max_requests: 1,
        };
        let store = MemoryRateLimitStore::new();
        let now = Instant::now();
        assert!(store.hit("api:1.2.3.4", &policy, now).success);
        assert!(!store.hit("api:1.2.3.4", &policy, now).success);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_clears_expired_entries() {
        let store = Arc::new(MemoryRateLimitStore::new());
        let policy = RateLimitPolicy::new(Duration::from_millis(10), 5);
        let _ = store.hit("login:1.2.3.4", &policy, Instant::now());
        std::thread::sleep(Duration::from_millis(20));

        let handle = spawn_sweeper(store.clone(), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(store.is_empty());
        handle.abort();
    }
}
