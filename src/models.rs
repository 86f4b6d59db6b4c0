//! Analysis results exchanged between providers and the cache

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detect::{DetectedIndicator, IndicatorType};

/// Outcome of one provider lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Provider returned reputation data
    Success,
    /// Provider has no record of the indicator
    NotFound,
    /// Lookup failed (network, quota, upstream error)
    Error,
}

/// Reputation data for one indicator from one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub provider: String,
    pub indicator_type: IndicatorType,
    pub indicator_value: String,
    pub status: AnalysisStatus,

    /// Provider-specific payload, passed through untouched
    #[serde(default)]
    pub data: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    fn new(provider: &str, indicator: &DetectedIndicator, status: AnalysisStatus) -> Self {
        Self {
            provider: provider.to_string(),
            indicator_type: indicator.indicator_type,
            indicator_value: indicator.value.clone(),
            status,
            data: serde_json::Value::Null,
            error: None,
            analyzed_at: Utc::now(),
        }
    }

    pub fn success(
        provider: &str,
        indicator: &DetectedIndicator,
        data: serde_json::Value,
    ) -> Self {
        Self {
            data,
            ..Self::new(provider, indicator, AnalysisStatus::Success)
        }
    }

    pub fn not_found(provider: &str, indicator: &DetectedIndicator) -> Self {
        Self::new(provider, indicator, AnalysisStatus::NotFound)
    }

    pub fn failure(
        provider: &str,
        indicator: &DetectedIndicator,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(provider, indicator, AnalysisStatus::Error)
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == AnalysisStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Position;

    fn indicator() -> DetectedIndicator {
        DetectedIndicator {
            indicator_type: IndicatorType::Domain,
            value: "evil.example.com".to_string(),
            position: Position::new(0, 16),
        }
    }

    #[test]
    fn test_failure_carries_message() {
        let result = AnalysisResult::failure("otx", &indicator(), "timeout");
        assert!(result.is_error());
        assert_eq!(result.error.as_deref(), Some("timeout"));
        assert_eq!(result.indicator_value, "evil.example.com");
    }

    #[test]
    fn test_json_shape() {
        let result =
            AnalysisResult::success("virustotal", &indicator(), serde_json::json!({"malicious": 3}));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["indicator_type"], "domain");
        assert_eq!(json["data"]["malicious"], 3);
        assert!(json.get("error").is_none());
    }
}
