//! Per-provider rate limiting
//!
//! Reactive: a provider's limiter only starts pacing calls after that
//! provider has reported a rate-limit error.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use tokio::sync::RwLock;

/// Rate limiter state for a single provider.
pub struct ProviderRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    active: AtomicBool,
    provider: String,
}

impl ProviderRateLimiter {
    /// Create a limiter allowing `rate` requests per second once active.
    pub fn new(provider: &str, rate: f64) -> Self {
        Self {
            limiter: RateLimiter::direct(quota_for(rate)),
            active: AtomicBool::new(false),
            provider: provider.to_string(),
        }
    }

    /// Activate rate limiting for this provider.
    pub fn activate(&self) {
        let was_active = self.active.swap(true, Ordering::SeqCst);
        if !was_active {
            debug!("Rate limiting activated for {}", self.provider);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for permission if rate limiting is active.
    pub async fn wait_if_active(&self) {
        if self.is_active() {
            debug!("Waiting for rate limiter {}", self.provider);
            self.limiter.until_ready().await;
        }
    }
}

/// Sub-1 rates (free API tiers, e.g. 4/min) become per-minute quotas
fn quota_for(rate: f64) -> Quota {
    if rate >= 1.0 {
        Quota::per_second(NonZeroU32::new(rate as u32).unwrap_or(NonZeroU32::MIN))
    } else {
        let per_min = (rate * 60.0).round() as u32;
        Quota::per_minute(NonZeroU32::new(per_min).unwrap_or(NonZeroU32::MIN))
    }
}

/// Rate limiters for every registered provider.
pub struct RateLimiterSet {
    limiters: RwLock<HashMap<String, ProviderRateLimiter>>,
}

impl RateLimiterSet {
    /// Build limiters from (provider, requests per second) pairs.
    /// A repeated provider name keeps its first rate.
    pub fn from_rates<'a>(rates: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut map = HashMap::new();
        for (provider, rate) in rates {
            map.entry(provider.to_string())
                .or_insert_with(|| ProviderRateLimiter::new(provider, rate));
        }
        Self {
            limiters: RwLock::new(map),
        }
    }

    /// Wait for rate limit permission for a provider (if active).
    pub async fn wait_for(&self, provider: &str) {
        let limiters = self.limiters.read().await;
        if let Some(limiter) = limiters.get(provider) {
            limiter.wait_if_active().await;
        }
    }

    /// Activate rate limiting for a provider (called on a rate-limit error).
    pub async fn activate(&self, provider: &str) {
        let limiters = self.limiters.read().await;
        if let Some(limiter) = limiters.get(provider) {
            limiter.activate();
        }
    }

    pub async fn is_active(&self, provider: &str) -> bool {
        self.limiters
            .read()
            .await
            .get(provider)
            .is_some_and(|l| l.is_active())
    }
}
