//! Per-call request configuration.

use crate::{Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::time::Duration;

/// Describes a single logical call: method, body, headers and overrides.
///
/// The target path is passed to [`Client::request`](crate::Client::request)
/// alongside this value.
///
/// # Examples
///
/// ```
/// use avaagent_client::RequestConfig;
/// use http::Method;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), avaagent_client::Error> {
/// let config = RequestConfig::new(Method::POST)
///     .json(&serde_json::json!({ "name": "Treasury bot" }))?
///     .header("X-Request-Source", "dashboard")?
///     .timeout(Duration::from_secs(5))
///     .retries(0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// The HTTP method.
    pub method: Method,

    /// The JSON request body, already serialized.
    pub body: Option<Vec<u8>>,

    /// Extra headers. These override the client's defaults, `Content-Type` included.
    pub headers: HeaderMap,

    /// Query parameters appended to the URL, in order.
    pub query_params: Vec<(String, String)>,

    /// Per-attempt timeout. `None` uses the client's timeout.
    pub timeout: Option<Duration>,

    /// Number of retries. `None` uses the client's retry policy.
    pub retries: Option<usize>,

    /// Do not attach an `Authorization` header even if a token provider is set.
    pub skip_auth: bool,
}

impl RequestConfig {
    /// Creates a configuration for the given method with no body or overrides.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: HeaderMap::new(),
            query_params: Vec::new(),
            timeout: None,
            retries: None,
            skip_auth: false,
        }
    }

    /// Serializes `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let bytes =
            serde_json::to_vec(body).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds another value for a header, keeping any values already set.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn append_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Adds a query parameter to the request.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.push((key.into(), value.to_string()));
        self
    }

    /// Overrides the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the number of retries.
    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Sends the request without an `Authorization` header.
    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_header_is_configuration_error() {
        let result = RequestConfig::default().header("bad header", "x");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_json_body_is_serialized() {
        let config = RequestConfig::new(Method::POST)
            .json(&serde_json::json!({ "name": "a" }))
            .unwrap();
        assert_eq!(config.body.as_deref(), Some(br#"{"name":"a"}"#.as_slice()));
    }
}
