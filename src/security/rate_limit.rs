//! Per-client token bucket rate limiting.
//!
//! # Responsibilities
//! - Keep one bucket per [`ClientKey`], created full on first sight
//! - Refill in whole windows (no continuous leak), never above capacity
//! - Sweep buckets whose next observation would find them full anyway
//!
//! # Design Decisions
//! - The registry is a `DashMap`; `admit` holds the shard write lock for the
//!   whole refill, check and decrement, so concurrent callers with the same
//!   key cannot spend the last token twice
//! - Time is passed in (`admit_at`) so window arithmetic is testable

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::security::client_key::ClientKey;

/// A single client's bucket.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: u32,
    refill_tokens: u32,
    window: Duration,
    tokens: u32,
    last_refill: Instant,
}

impl TokenBucket {
    /// A full bucket whose first window starts at `now`.
    pub fn new(capacity: u32, refill_tokens: u32, window: Duration, now: Instant) -> Self {
        Self {
            capacity,
            refill_tokens,
            window,
            tokens: capacity,
            last_refill: now,
        }
    }

    pub fn tokens_remaining(&self) -> u32 {
        self.tokens
    }

    /// Credit every whole window elapsed since the last refill.
    pub fn refill(&mut self, now: Instant) {
        let windows = self.elapsed_windows(now);
        if windows == 0 {
            return;
        }

        let owed = windows.saturating_mul(u128::from(self.refill_tokens));
        let topped_up = (u128::from(self.tokens) + owed).min(u128::from(self.capacity));
        self.tokens = u32::try_from(topped_up).unwrap_or(self.capacity);

        let advance = windows.saturating_mul(self.window.as_nanos());
        self.last_refill += Duration::from_nanos(u64::try_from(advance).unwrap_or(u64::MAX));
    }

    /// Refill, then take one token if any is left.
    pub fn try_consume(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// True when refilling at `now` would leave the bucket full, making it
    /// indistinguishable from a freshly created one.
    pub fn is_idle(&self, now: Instant) -> bool {
        let owed = self
            .elapsed_windows(now)
            .saturating_mul(u128::from(self.refill_tokens));
        u128::from(self.tokens) + owed >= u128::from(self.capacity)
    }

    fn elapsed_windows(&self, now: Instant) -> u128 {
        let elapsed = now.saturating_duration_since(self.last_refill).as_nanos();
        elapsed / self.window.as_nanos().max(1)
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Rejected { retry_after_secs: u64 },
}

/// Keyed registry of token buckets.
pub struct RateLimiter {
    buckets: DashMap<ClientKey, TokenBucket>,
    enabled: bool,
    capacity: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            enabled: true,
            capacity,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            ..Self::new(config.capacity, Duration::from_secs(config.window_secs))
        }
    }

    pub fn admit(&self, key: &ClientKey) -> Admission {
        self.admit_at(key, Instant::now())
    }

    pub fn admit_at(&self, key: &ClientKey, now: Instant) -> Admission {
        if !self.enabled {
            return Admission::Allowed;
        }

        let mut bucket = self
            .buckets
            .entry(key.clone())
            .or_insert_with(|| TokenBucket::new(self.capacity, self.capacity, self.window, now));

        if bucket.try_consume(now) {
            Admission::Allowed
        } else {
            Admission::Rejected {
                retry_after_secs: self.window.as_secs(),
            }
        }
    }

    /// Tokens left for `key`, if a bucket exists. Does not refill.
    pub fn remaining(&self, key: &ClientKey) -> Option<u32> {
        self.buckets.get(key).map(|b| b.tokens_remaining())
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }

    /// Drop every idle bucket. Returns how many were removed.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| !bucket.is_idle(now));
        before.saturating_sub(self.buckets.len())
    }

    /// Periodically evict idle buckets until shutdown.
    pub async fn run_sweeper(self: Arc<Self>, every: Duration, mut shutdown: broadcast::Receiver<()>) {
        if !self.enabled {
            return;
        }

        tracing::info!(interval_secs = every.as_secs(), "Rate limit sweeper starting");
        let mut ticker = time::interval(every);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = self.evict_idle(Instant::now());
                    let tracked = self.tracked_clients();
                    metrics::record_tracked_clients(tracked);
                    if evicted > 0 {
                        tracing::debug!(evicted, tracked, "Evicted idle rate limit buckets");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate limit sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
