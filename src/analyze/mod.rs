//! Provider dispatch: detect, consult the cache, then ask providers
//!
//! For every (provider, indicator) pair the provider supports, the cache is
//! checked first. Only misses reach the provider, and the outcome is written
//! back. Failed lookups are not cached unless `cache_errors` is set, so a
//! transient upstream outage is not replayed for the whole retention window.

#[cfg(test)]
pub mod mock;
pub mod provider;
pub mod rate_limit;

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::{CacheManager, Clock, KeyValueStore, SystemClock};
use crate::detect::{self, DetectedIndicator};
use crate::error::ProviderError;
use crate::models::AnalysisResult;

pub use provider::{DEFAULT_PROVIDER_RATE, ThreatIntelProvider};
pub use rate_limit::RateLimiterSet;

/// Dispatch options
#[derive(Debug, Clone, Copy)]
pub struct AnalyzerOptions {
    /// Also cache results whose status is `Error`
    pub cache_errors: bool,
    /// Upper bound on in-flight provider calls
    pub max_concurrent: usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            cache_errors: false,
            max_concurrent: 8,
        }
    }
}

/// Runs indicators past a set of providers through the result cache
pub struct Analyzer<S, C = SystemClock> {
    providers: Vec<Arc<dyn ThreatIntelProvider>>,
    cache: Arc<CacheManager<S, C>>,
    limiters: RateLimiterSet,
    options: AnalyzerOptions,
}

impl<S: KeyValueStore, C: Clock> Analyzer<S, C> {
    pub fn new(
        cache: Arc<CacheManager<S, C>>,
        providers: Vec<Arc<dyn ThreatIntelProvider>>,
        options: AnalyzerOptions,
    ) -> Self {
        let limiters =
            RateLimiterSet::from_rates(providers.iter().map(|p| (p.name(), p.rate_limit())));
        Self {
            providers,
            cache,
            limiters,
            options,
        }
    }

    pub fn providers(&self) -> &[Arc<dyn ThreatIntelProvider>] {
        &self.providers
    }

    pub fn cache(&self) -> &CacheManager<S, C> {
        &self.cache
    }

    /// Detect indicators in `text` and look each one up
    pub async fn analyze_text(&self, text: &str) -> Vec<AnalysisResult> {
        let indicators = detect::detect_indicators(text);
        self.analyze_indicators(&indicators).await
    }

    /// Look up every indicator with every provider that supports its type.
    ///
    /// Repeated (type, value) pairs are looked up once. Results come back in
    /// indicator order, then provider registration order.
    pub async fn analyze_indicators(
        &self,
        indicators: &[DetectedIndicator],
    ) -> Vec<AnalysisResult> {
        let mut seen = HashSet::new();
        let jobs: Vec<(&dyn ThreatIntelProvider, &DetectedIndicator)> = indicators
            .iter()
            .filter(|ind| seen.insert((ind.indicator_type, ind.value.as_str())))
            .flat_map(|ind| {
                self.providers
                    .iter()
                    .filter(move |p| p.supports(ind.indicator_type))
                    .map(move |p| (p.as_ref(), ind))
            })
            .collect();

        debug!(
            "Dispatching {} lookups with max {} concurrent",
            jobs.len(),
            self.options.max_concurrent
        );

        stream::iter(jobs)
            .map(|(provider, indicator)| self.analyze_one(provider, indicator))
            .buffered(self.options.max_concurrent.max(1))
            .collect()
            .await
    }

    async fn analyze_one(
        &self,
        provider: &dyn ThreatIntelProvider,
        indicator: &DetectedIndicator,
    ) -> AnalysisResult {
        let name = provider.name();

        if let Some(cached) = self
            .cache
            .get_result(name, indicator.indicator_type, &indicator.value)
            .await
        {
            debug!("Cache hit: {} {}", name, indicator.value);
            return cached;
        }

        self.limiters.wait_for(name).await;

        let result = match provider.analyze(indicator).await {
            Ok(result) => result,
            Err(e) => {
                if matches!(e, ProviderError::RateLimit(..)) {
                    self.limiters.activate(name).await;
                }
                warn!("{} lookup for {} failed: {}", name, indicator.value, e);
                AnalysisResult::failure(name, indicator, e.to_string())
            }
        };

        if !result.is_error() || self.options.cache_errors {
            self.cache.store_result(&result).await;
        }
        result
    }
}
