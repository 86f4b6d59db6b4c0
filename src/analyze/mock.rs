//! Canned provider for testing
//!
//! Answers every supported lookup from a fixed script and counts calls, so
//! tests can tell cache hits from upstream requests.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::provider::ThreatIntelProvider;
use crate::detect::{DetectedIndicator, IndicatorType};
use crate::error::ProviderError;
use crate::models::AnalysisResult;

/// What the mock returns for every call
#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    Success,
    NotFound,
    Fail,
    RateLimited,
}

pub struct MockProvider {
    name: String,
    types: Vec<IndicatorType>,
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(name: &str, types: &[IndicatorType]) -> Self {
        Self {
            name: name.to_string(),
            types: types.to_vec(),
            behavior: MockBehavior::Success,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThreatIntelProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, indicator_type: IndicatorType) -> bool {
        self.types.contains(&indicator_type)
    }

    fn rate_limit(&self) -> f64 {
        1000.0
    }

    async fn analyze(
        &self,
        indicator: &DetectedIndicator,
    ) -> Result<AnalysisResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Success => Ok(AnalysisResult::success(
                &self.name,
                indicator,
                json!({"malicious": 1, "source": self.name}),
            )),
            MockBehavior::NotFound => Ok(AnalysisResult::not_found(&self.name, indicator)),
            MockBehavior::Fail => Err(ProviderError::Upstream(
                self.name.clone(),
                "503 Service Unavailable".to_string(),
            )),
            MockBehavior::RateLimited => Err(ProviderError::RateLimit(
                self.name.clone(),
                std::time::Duration::from_secs(60),
            )),
        }
    }
}
