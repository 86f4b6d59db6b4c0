//! Threat-intel provider trait

use async_trait::async_trait;

use crate::detect::{DetectedIndicator, IndicatorType};
use crate::error::ProviderError;
use crate::models::AnalysisResult;

/// Default pacing once a provider starts returning rate-limit errors
pub const DEFAULT_PROVIDER_RATE: f64 = 4.0;

/// A reputation source such as VirusTotal, OTX or AbuseIPDB.
///
/// Implementations own their HTTP clients, credentials and request
/// timeouts; the analyzer only decides when to call them.
#[async_trait]
pub trait ThreatIntelProvider: Send + Sync {
    /// Stable provider name, used in cache keys
    fn name(&self) -> &str;

    /// Whether this provider can look up the given indicator type
    fn supports(&self, indicator_type: IndicatorType) -> bool;

    /// Requests per second allowed once rate limiting kicks in
    fn rate_limit(&self) -> f64 {
        DEFAULT_PROVIDER_RATE
    }

    /// Look up one indicator
    async fn analyze(&self, indicator: &DetectedIndicator)
    -> Result<AnalysisResult, ProviderError>;
}
