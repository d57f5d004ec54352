//! The response envelope returned by [`Client::request`](crate::Client::request).

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful response: decoded body plus status, headers and timing.
///
/// The convenience methods on [`Client`](crate::Client) (`get`, `post`, ...)
/// return only [`Response::data`]; use [`Client::request`](crate::Client::request)
/// when the status or headers matter.
///
/// # Examples
///
/// ```no_run
/// use avaagent_client::{Client, RequestConfig};
///
/// # async fn example() -> Result<(), avaagent_client::Error> {
/// let client = Client::builder()
///     .base_url("http://localhost:8000/api/v1")?
///     .build()?;
///
/// let response = client
///     .request::<serde_json::Value>("/health", RequestConfig::default())
///     .await?;
///
/// println!("{} after {} attempt(s) in {:?}", response.status, response.attempts, response.latency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded body. For `204 No Content` this is `T` decoded from JSON `null`.
    pub data: T,

    /// The raw body text. Empty for `204 No Content`.
    pub raw_body: String,

    /// The HTTP status code.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from the first attempt until this response was decoded.
    pub latency: Duration,

    /// Attempts made, `1` when no retry was needed.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    /// Maps the body to a different type, keeping the metadata.
    ///
    /// ```
    /// # use avaagent_client::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     vec![1, 2, 3],
    ///     "[1,2,3]".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(12),
    ///     1,
    /// );
    ///
    /// assert_eq!(response.map(|v| v.len()).data, 3);
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Consumes the response and returns the decoded body.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Returns `true` if the call needed more than one attempt.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
