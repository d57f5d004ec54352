//! Error types for backend API calls.
//!
//! Every failed call resolves to an [`Error`]. Failures reported by the backend
//! itself (any non-2xx response) are carried by [`ApiError`], which keeps the
//! status code together with the `message`, `code` and `details` fields the
//! backend put in the response body.

use http::{HeaderMap, StatusCode};
use serde_json::Value;

/// A non-2xx response from the backend, or an error shaped like one.
///
/// # Examples
///
/// ```
/// use avaagent_client::ApiError;
/// use http::StatusCode;
/// use serde_json::json;
///
/// let err = ApiError::new(StatusCode::BAD_REQUEST, "Invalid request")
///     .with_code("VALIDATION_ERROR")
///     .with_details(json!({ "field": "name" }));
///
/// assert_eq!(err.status(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.message(), "Invalid request");
/// assert_eq!(err.code(), Some("VALIDATION_ERROR"));
/// assert_eq!(err.details().unwrap()["field"], "name");
/// ```
#[derive(thiserror::Error, Debug, Clone)]
#[error("{message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: Option<String>,
    details: Option<Value>,
    raw_response: String,
    headers: HeaderMap,
}

impl ApiError {
    /// Creates an error with the given status and message and no code or details.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
            details: None,
            raw_response: String::new(),
            headers: HeaderMap::new(),
        }
    }

    /// Sets the machine-readable error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the structured error details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Builds an error from a failed response.
    ///
    /// The body is decoded as JSON when possible. A body that is not JSON, or
    /// is JSON without the expected fields, still produces an error; the
    /// missing fields are simply absent and the message falls back to
    /// `HTTP error <status>`.
    ///
    /// Besides the `{message, code, details}` shape, FastAPI's
    /// `{"detail": ...}` shape is understood: a string `detail` is used as the
    /// message and any other `detail` value as the details.
    pub fn from_response(status: StatusCode, headers: HeaderMap, raw_response: String) -> Self {
        let body = serde_json::from_str::<Value>(&raw_response)
            .unwrap_or_else(|_| Value::Object(Default::default()));

        let detail = body.get("detail");
        let message = field_str(&body, "message")
            .or_else(|| detail.and_then(Value::as_str).map(str::to_string))
            .or_else(|| field_str(&body, "error"))
            .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));

        let code = body.get("code").and_then(|code| match code {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        let details = body
            .get("details")
            .filter(|v| !v.is_null())
            .or_else(|| detail.filter(|v| !v.is_string() && !v.is_null()))
            .cloned();

        Self {
            status,
            message,
            code,
            details,
            raw_response,
            headers,
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The machine-readable code, if the backend sent one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Structured details, if the backend sent any.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// The raw response body. Empty for errors constructed directly.
    pub fn raw_response(&self) -> &str {
        &self.raw_response
    }

    /// The response headers. Empty for errors constructed directly.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

fn field_str(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The main error type for backend API calls.
///
/// # Examples
///
/// ```no_run
/// use avaagent_client::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .base_url("http://localhost:8000/api/v1")?
///     .build()?;
///
/// match client.get::<serde_json::Value>("/agents").await {
///     Ok(agents) => println!("Agents: {agents}"),
///     Err(Error::Api(err)) => {
///         eprintln!("Backend said {}: {}", err.status(), err.message());
///     }
///     Err(Error::Timeout) => eprintln!("Backend did not answer in time"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The backend answered with a non-2xx status.
    #[error(transparent)]
    Api(Box<ApiError>),

    /// A single attempt exceeded its deadline.
    ///
    /// Reported with status 408. Timeouts end the call; they are not retried.
    #[error("Request timed out")]
    Timeout,

    /// A network-level error occurred (connection refused, DNS, reset, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be converted into the expected type.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The request body could not be serialized to JSON.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration, such as a malformed header or a missing base URL.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The token provider failed to produce a bearer token.
    #[error("Failed to obtain access token: {0}")]
    Token(String),
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(Box::new(err))
    }
}

impl Error {
    /// Returns `true` if a request that failed this way is worth repeating.
    ///
    /// Transport errors and responses with status 408, 429 or 5xx are
    /// retryable. [`Error::Timeout`] is not: an attempt that ran out of time
    /// ends the call, even though a 408 *response* is retried.
    ///
    /// # Examples
    ///
    /// ```
    /// use avaagent_client::{ApiError, Error};
    /// use http::StatusCode;
    ///
    /// let err: Error = ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "down").into();
    /// assert!(err.is_retryable());
    ///
    /// let err: Error = ApiError::new(StatusCode::BAD_REQUEST, "bad").into();
    /// assert!(!err.is_retryable());
    ///
    /// assert!(!Error::Timeout.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api(err) => crate::retry::is_retryable_status(err.status()),
            Error::Network(e) => !e.is_timeout(),
            Error::Timeout => false,
            Error::DeserializationFailed { .. } => false,
            Error::SerializationFailed(_) => false,
            Error::InvalidUrl(_) => false,
            Error::Configuration(_) => false,
            Error::Token(_) => false,
        }
    }

    /// Returns the HTTP status associated with this error.
    ///
    /// Timeouts report `408 Request Timeout`. Errors raised before any
    /// response was received have no status.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(err) => Some(err.status()),
            Error::Timeout => Some(StatusCode::REQUEST_TIMEOUT),
            Error::DeserializationFailed { status, .. } => Some(*status),
            Error::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Returns the backend's machine-readable error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Api(err) => err.code(),
            _ => None,
        }
    }

    /// Returns the backend's structured error details, if any.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Error::Api(err) => err.details(),
            _ => None,
        }
    }

    /// Returns a one-line human-readable message suitable for a notification.
    pub fn message(&self) -> String {
        match self {
            Error::Api(err) => err.message().to_string(),
            other => other.to_string(),
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Api(err) => Some(err.raw_response()),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the [`ApiError`] if the backend rejected the call.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// A specialized `Result` type for backend API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_response_reads_message_code_details() {
        let body = json!({
            "message": "Invalid request",
            "code": "VALIDATION_ERROR",
            "details": { "field": "name" }
        })
        .to_string();

        let err = ApiError::from_response(StatusCode::BAD_REQUEST, HeaderMap::new(), body);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Invalid request");
        assert_eq!(err.code(), Some("VALIDATION_ERROR"));
        assert_eq!(err.details().unwrap()["field"], "name");
    }

    #[test]
    fn test_from_response_fastapi_detail_string() {
        let body = r#"{"detail": "Agent not found"}"#.to_string();
        let err = ApiError::from_response(StatusCode::NOT_FOUND, HeaderMap::new(), body);

        assert_eq!(err.message(), "Agent not found");
        assert_eq!(err.code(), None);
        assert!(err.details().is_none());
    }

    #[test]
    fn test_from_response_fastapi_validation_detail() {
        let body = json!({
            "error": "Validation error",
            "detail": [{ "loc": ["body", "name"], "msg": "field required" }]
        })
        .to_string();
        let err =
            ApiError::from_response(StatusCode::UNPROCESSABLE_ENTITY, HeaderMap::new(), body);

        assert_eq!(err.message(), "Validation error");
        assert_eq!(err.details().unwrap()[0]["msg"], "field required");
    }

    #[test]
    fn test_from_response_non_json_body() {
        let err = ApiError::from_response(
            StatusCode::BAD_GATEWAY,
            HeaderMap::new(),
            "<html>bad gateway</html>".to_string(),
        );

        assert_eq!(err.message(), "HTTP error 502");
        assert_eq!(err.raw_response(), "<html>bad gateway</html>");
        assert!(err.code().is_none());
    }

    #[test]
    fn test_numeric_code_is_kept() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            HeaderMap::new(),
            r#"{"message": "nope", "code": 4001}"#.to_string(),
        );
        assert_eq!(err.code(), Some("4001"));
    }

    #[test]
    fn test_timeout_reports_408() {
        assert_eq!(Error::Timeout.status(), Some(StatusCode::REQUEST_TIMEOUT));
        assert!(!Error::Timeout.is_retryable());
    }

    #[test]
    fn test_error_accessors_delegate_to_api_error() {
        let err: Error = ApiError::new(StatusCode::TOO_MANY_REQUESTS, "slow down")
            .with_code("RATE_LIMITED")
            .into();

        assert!(err.is_retryable());
        assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(err.code(), Some("RATE_LIMITED"));
        assert_eq!(err.message(), "slow down");
        assert_eq!(err.to_string(), "slow down");
    }
}
