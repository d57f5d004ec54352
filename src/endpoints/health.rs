//! Health check endpoints

use crate::{Client, RequestConfig, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Health check API interface
///
/// Health endpoints are public, so these calls never send a bearer token.
#[derive(Clone)]
pub struct HealthApi {
    client: Client,
}

impl HealthApi {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Basic health check.
    pub async fn check(&self) -> Result<HealthStatus> {
        self.client.get_with("/health", public()).await
    }

    /// Readiness, including the backend's own dependencies.
    pub async fn ready(&self) -> Result<Readiness> {
        self.client.get_with("/health/ready", public()).await
    }

    /// Liveness probe.
    pub async fn live(&self) -> Result<HealthStatus> {
        self.client.get_with("/health/live", public()).await
    }

    /// Service name, version, enabled features and supported networks.
    pub async fn info(&self) -> Result<ServiceInfo> {
        self.client.get_with("/info", public()).await
    }
}

fn public() -> RequestConfig {
    RequestConfig::default().skip_auth()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `healthy` or `alive`
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    /// `ready` or `not_ready`
    pub status: String,
    #[serde(default)]
    pub checks: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub environment: String,
    /// Feature flags such as `x402_payments` or `ai_inference`.
    #[serde(default)]
    pub features: BTreeMap<String, bool>,
    #[serde(default)]
    pub networks: Vec<String>,
}

impl ServiceInfo {
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.get(feature).copied().unwrap_or(false)
    }
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.status == "ready" && self.checks.values().all(|ok| *ok)
    }

    /// Names of the dependency checks that failed.
    pub fn failing(&self) -> impl Iterator<Item = &str> {
        self.checks
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_deserialize() {
        let json = r#"{"status": "not_ready", "checks": {"database": false, "cache": true}}"#;
        let readiness: Readiness = serde_json::from_str(json).unwrap();

        assert!(!readiness.is_ready());
        assert_eq!(readiness.failing().collect::<Vec<_>>(), vec!["database"]);
    }

    #[test]
    fn test_service_info_features() {
        let info: ServiceInfo = serde_json::from_str(
            r#"{"name": "AvaAgent Backend", "version": "1.0.0",
                "features": {"ai_inference": true, "multi_chain": false},
                "networks": ["avalanche_fuji"]}"#,
        )
        .unwrap();
        assert!(info.has_feature("ai_inference"));
        assert!(!info.has_feature("multi_chain"));
        assert!(!info.has_feature("unknown"));
    }

    #[test]
    fn test_health_status_minimal() {
        let status: HealthStatus = serde_json::from_str(r#"{"status": "alive"}"#).unwrap();
        assert_eq!(status.status, "alive");
        assert!(status.service.is_none());
    }
}
