//! Environment-driven client configuration.

use crate::{Error, Result, RetryPolicy};
use std::env;
use std::time::Duration;
use url::Url;

/// Base URL used when no environment variable names one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Per-attempt timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a [`Client`](crate::Client) needs that usually comes from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend API, e.g. `https://api.example.com/api/v1`.
    pub base_url: String,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            user_agent: concat!("avaagent-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads configuration from environment variables.
    ///
    /// - `AVAAGENT_API_URL`, else `NEXT_PUBLIC_API_URL`, else `API_URL`: base URL
    /// - `AVAAGENT_TIMEOUT_SECS`: per-attempt timeout in seconds
    /// - `AVAAGENT_MAX_RETRIES`: number of retries after the first attempt
    ///
    /// Unset or unparseable numeric variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration fails [`validate`](Self::validate).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let base_url = ["AVAAGENT_API_URL", "NEXT_PUBLIC_API_URL", "API_URL"]
            .iter()
            .find_map(|key| lookup(*key).filter(|v| !v.trim().is_empty()))
            .unwrap_or(defaults.base_url);

        let timeout = lookup("AVAAGENT_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let retry = match lookup("AVAAGENT_MAX_RETRIES").and_then(|s| s.trim().parse().ok()) {
            Some(max_retries) => defaults.retry.with_max_retries(max_retries),
            None => defaults.retry,
        };

        let config = Self {
            base_url,
            timeout,
            retry,
            user_agent: defaults.user_agent,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can produce a working client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for an unparseable base URL and
    /// [`Error::Configuration`] for a non-HTTP scheme or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Configuration(format!(
                "Base URL must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(Error::Configuration("Timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_url_precedence() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("API_URL", "http://fallback:8000/api/v1"),
            ("NEXT_PUBLIC_API_URL", "https://public.example.com/api/v1"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://public.example.com/api/v1");

        let config = ClientConfig::from_lookup(lookup(&[
            ("AVAAGENT_API_URL", "https://primary.example.com"),
            ("NEXT_PUBLIC_API_URL", "https://public.example.com/api/v1"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://primary.example.com");
    }

    #[test]
    fn test_numeric_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("AVAAGENT_TIMEOUT_SECS", "5"),
            ("AVAAGENT_MAX_RETRIES", "0"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_retries, 0);

        let config =
            ClientConfig::from_lookup(lookup(&[("AVAAGENT_TIMEOUT_SECS", "soon")])).unwrap();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_validation_failures() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("API_URL", "not a url")])),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("API_URL", "ftp://files.example.com")])),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("AVAAGENT_TIMEOUT_SECS", "0")])),
            Err(Error::Configuration(_))
        ));
    }
}
