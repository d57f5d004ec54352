//! HTTP client with per-attempt timeouts, backoff retries and typed errors.
//!
//! The [`Client`] type is the main entry point for talking to the backend.
//! Use [`ClientBuilder`] to configure and create clients.

use crate::{
    auth::TokenProvider,
    config::{ClientConfig, DEFAULT_TIMEOUT},
    endpoints::{AgentsApi, AiApi, CommerceApi, DataApi, HealthApi, IntentsApi, WalletsApi},
    retry::{RetryOnTransient, RetryPolicy, RetryPredicate},
    stream::TextStream,
    ApiError, Error, RequestConfig, Response, Result,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use url::Url;

/// An HTTP client for the AvaAgent backend.
///
/// Clones share one connection pool, configuration and token provider.
///
/// # Examples
///
/// ```no_run
/// use avaagent_client::{Client, RetryPolicy};
/// use serde::{Deserialize, Serialize};
/// use std::time::Duration;
///
/// #[derive(Serialize)]
/// struct CreateAgent {
///     name: String,
/// }
///
/// #[derive(Deserialize)]
/// struct Agent {
///     id: String,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), avaagent_client::Error> {
/// let client = Client::builder()
///     .base_url("http://localhost:8000/api/v1")?
///     .timeout(Duration::from_secs(10))
///     .retry_policy(RetryPolicy::default().with_max_retries(2))
///     .token_provider(|| async { Some("session-token".to_string()) })
///     .build()?;
///
/// let agent: Agent = client
///     .post("/agents", &CreateAgent { name: "Treasury bot".to_string() })
///     .await?;
/// println!("Created agent {} ({})", agent.name, agent.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    retry_policy: RetryPolicy,
    retry_predicate: Box<dyn RetryPredicate>,
    timeout: Duration,
    token_provider: RwLock<Option<Arc<dyn TokenProvider>>>,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        ClientBuilder::from_config(config)?.build()
    }

    /// Creates a client configured from environment variables.
    ///
    /// See [`ClientConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ClientConfig::from_env()?)
    }

    /// The base URL every path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Replaces the token provider for this client and all of its clones.
    pub fn set_token_provider(&self, provider: impl TokenProvider + 'static) {
        *self
            .inner
            .token_provider
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(provider));
    }

    /// Removes the token provider; subsequent calls carry no `Authorization` header.
    pub fn clear_token_provider(&self) {
        *self
            .inner
            .token_provider
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Agent endpoints.
    pub fn agents(&self) -> AgentsApi {
        AgentsApi::new(self.clone())
    }

    /// Wallet, policy and spend-limit endpoints.
    pub fn wallets(&self) -> WalletsApi {
        WalletsApi::new(self.clone())
    }

    /// Natural-language intent endpoints.
    pub fn intents(&self) -> IntentsApi {
        IntentsApi::new(self.clone())
    }

    /// Marketplace search, purchase and order endpoints.
    pub fn commerce(&self) -> CommerceApi {
        CommerceApi::new(self.clone())
    }

    /// Prices, yields, sentiment and other market data.
    pub fn data(&self) -> DataApi {
        DataApi::new(self.clone())
    }

    /// AI chat, intent analysis and transaction planning endpoints.
    pub fn ai(&self) -> AiApi {
        AiApi::new(self.clone())
    }

    /// Health check endpoints.
    pub fn health(&self) -> HealthApi {
        HealthApi::new(self.clone())
    }

    /// Makes one logical call, retrying transient failures.
    ///
    /// Each attempt is bounded by the timeout. Responses with status 408, 429
    /// or 5xx and transport errors are retried with exponential backoff until
    /// the retry budget runs out; the last failure is then returned. An
    /// attempt that times out ends the call with [`Error::Timeout`].
    ///
    /// A `204 No Content` response decodes `T` from JSON `null` without
    /// reading the body. Any other body is decoded as JSON, with a body that
    /// is not JSON treated as `{}`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use avaagent_client::{Client, RequestConfig};
    /// use http::Method;
    ///
    /// # async fn example() -> Result<(), avaagent_client::Error> {
    /// let client = Client::builder()
    ///     .base_url("http://localhost:8000/api/v1")?
    ///     .build()?;
    ///
    /// let config = RequestConfig::new(Method::GET)
    ///     .query("status", "active")
    ///     .retries(0);
    ///
    /// let response = client.request::<serde_json::Value>("/agents", config).await?;
    /// println!("{} agents", response.data["total"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn request<T>(&self, path: &str, config: RequestConfig) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(path, &config.query_params)?;
        let headers = self.request_headers(&config).await?;
        let timeout = config.timeout.unwrap_or(self.inner.timeout);
        let max_attempts = config
            .retries
            .unwrap_or(self.inner.retry_policy.max_retries)
            .saturating_add(1);

        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            tracing::debug!(
                method = %config.method,
                url = %url,
                attempt = attempt,
                "Executing HTTP request"
            );

            let mut request = self
                .inner
                .http_client
                .request(config.method.clone(), url.clone())
                .headers(headers.clone());
            if let Some(body) = &config.body {
                request = request.body(body.clone());
            }

            let result = match send_attempt(request, timeout).await {
                Ok(response) => decode_response(response, start_time, attempt).await,
                Err(e) => Err(e),
            };

            let error = match result {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            tracing::warn!(
                error = %error,
                attempt = attempt,
                method = %config.method,
                path = %path,
                "Request failed"
            );

            if attempt >= max_attempts || !self.inner.retry_predicate.should_retry(&error, attempt) {
                return Err(error);
            }

            let delay = self.inner.retry_policy.delay_for_retry(attempt);
            tracing::info!(
                delay_ms = delay.as_millis(),
                attempt = attempt,
                max_attempts = max_attempts,
                "Retrying request after delay"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Makes a GET request and returns the decoded body.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use avaagent_client::Client;
    ///
    /// # async fn example() -> Result<(), avaagent_client::Error> {
    /// let client = Client::builder()
    ///     .base_url("http://localhost:8000/api/v1")?
    ///     .build()?;
    ///
    /// let info: serde_json::Value = client.get("/info").await?;
    /// println!("Backend version {}", info["version"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.get_with(path, RequestConfig::default()).await
    }

    /// Makes a GET request with per-call overrides.
    pub async fn get_with<T>(&self, path: &str, config: RequestConfig) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send(Method::GET, path, None::<&()>, config).await
    }

    /// Makes a POST request with a JSON body and returns the decoded body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post_with(path, body, RequestConfig::default()).await
    }

    /// Makes a POST request with per-call overrides.
    pub async fn post_with<B, T>(&self, path: &str, body: &B, config: RequestConfig) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body), config).await
    }

    /// Makes a PUT request with a JSON body and returns the decoded body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.put_with(path, body, RequestConfig::default()).await
    }

    /// Makes a PUT request with per-call overrides.
    pub async fn put_with<B, T>(&self, path: &str, body: &B, config: RequestConfig) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(body), config).await
    }

    /// Makes a PATCH request with a JSON body and returns the decoded body.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.patch_with(path, body, RequestConfig::default()).await
    }

    /// Makes a PATCH request with per-call overrides.
    pub async fn patch_with<B, T>(&self, path: &str, body: &B, config: RequestConfig) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PATCH, path, Some(body), config).await
    }

    /// Makes a DELETE request and returns the decoded body.
    ///
    /// Use `()` or `Option<_>` as `T` for endpoints that answer `204 No Content`.
    pub async fn delete<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.delete_with(path, RequestConfig::default()).await
    }

    /// Makes a DELETE request with per-call overrides.
    pub async fn delete_with<T>(&self, path: &str, config: RequestConfig) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send(Method::DELETE, path, None::<&()>, config).await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        mut config: RequestConfig,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        config.method = method;
        if let Some(body) = body {
            config = config.json(body)?;
        }
        Ok(self.request::<T>(path, config).await?.into_data())
    }

    /// POSTs `body` and consumes the streamed response as text.
    ///
    /// Every chunk is passed to `on_chunk` exactly as received; the
    /// concatenation of all chunks is returned. Streams are neither retried
    /// nor bounded by the client timeout.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example(client: avaagent_client::Client) -> Result<(), avaagent_client::Error> {
    /// let body = serde_json::json!({ "message": "What is my USDC balance?" });
    /// let full = client
    ///     .stream("/ai/chat/stream", &body, |chunk| print!("{chunk}"))
    ///     .await?;
    /// println!("\n{} bytes received", full.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn stream<B, F>(&self, path: &str, body: &B, on_chunk: F) -> Result<String>
    where
        B: Serialize + ?Sized,
        F: FnMut(&str),
    {
        self.stream_text(path, body).await?.collect_with(on_chunk).await
    }

    /// POSTs `body` and returns the response body as a [`TextStream`].
    ///
    /// A non-2xx response is read in full and returned as [`Error::Api`].
    pub async fn stream_text<B>(&self, path: &str, body: &B) -> Result<TextStream>
    where
        B: Serialize + ?Sized,
    {
        let config = RequestConfig::new(Method::POST).json(body)?;
        let url = self.endpoint_url(path, &config.query_params)?;
        let headers = self.request_headers(&config).await?;

        tracing::debug!(url = %url, "Opening response stream");

        let mut request = self.inner.http_client.post(url).headers(headers);
        if let Some(body) = config.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        tracing::info!(status = response.status().as_u16(), "Streaming response");
        Ok(TextStream::new(response))
    }

    /// Resolves `path` against the base URL.
    ///
    /// Absolute `http(s)://` URLs are used as given. A query string in `path`
    /// is kept and `query` pairs are appended after it.
    fn endpoint_url(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = if path.starts_with("http://") || path.starts_with("https://") {
            Url::parse(path)?
        } else {
            let (path, inline_query) = match path.split_once('?') {
                Some((path, query)) => (path, Some(query)),
                None => (path, None),
            };
            let mut url = self.inner.base_url.clone();
            let joined = format!(
                "{}/{}",
                url.path().trim_end_matches('/'),
                path.trim_start_matches('/')
            );
            url.set_path(&joined);
            url.set_query(inline_query);
            url
        };

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Default headers, then the bearer token, then per-call headers.
    async fn request_headers(&self, config: &RequestConfig) -> Result<HeaderMap> {
        let mut headers = self.inner.default_headers.clone();

        if !config.skip_auth {
            if let Some(token) = self.bearer_token().await? {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    Error::Token("token contains characters not allowed in a header".to_string())
                })?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        for name in config.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in &config.headers {
            headers.append(name.clone(), value.clone());
        }

        Ok(headers)
    }

    async fn bearer_token(&self) -> Result<Option<String>> {
        let provider = self
            .inner
            .token_provider
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match provider {
            Some(provider) => provider.token().await,
            None => Ok(None),
        }
    }
}

/// Sends one attempt, cancelling it once `timeout` elapses.
async fn send_attempt(
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> Result<reqwest::Response> {
    match tokio::time::timeout(timeout, request.send()).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) if e.is_timeout() => Err(Error::Timeout),
        Ok(Err(e)) => Err(Error::Network(e)),
        Err(_elapsed) => {
            tracing::warn!(timeout_ms = timeout.as_millis(), "Request attempt timed out");
            Err(Error::Timeout)
        }
    }
}

/// Turns a response into a typed `Response`, or an error for non-2xx statuses.
async fn decode_response<T>(
    response: reqwest::Response,
    start_time: Instant,
    attempts: usize,
) -> Result<Response<T>>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let headers = response.headers().clone();
    let latency = start_time.elapsed();

    tracing::info!(
        status = status.as_u16(),
        latency_ms = latency.as_millis(),
        attempts = attempts,
        "Received HTTP response"
    );

    if status == StatusCode::NO_CONTENT {
        let data = from_json_value(Value::Null, String::new(), status)?;
        return Ok(Response::new(
            data,
            String::new(),
            status,
            headers,
            latency,
            attempts,
        ));
    }

    if !status.is_success() {
        return Err(api_error(response).await);
    }

    let raw_body = response.text().await?;
    let value = serde_json::from_str::<Value>(&raw_body)
        .unwrap_or_else(|_| Value::Object(Default::default()));
    let data = from_json_value(value, raw_body.clone(), status)?;

    Ok(Response::new(
        data, raw_body, status, headers, latency, attempts,
    ))
}

fn from_json_value<T>(value: Value, raw_body: String, status: StatusCode) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(
            error = %e,
            raw_response = %raw_body,
            "Failed to deserialize response"
        );

        Error::DeserializationFailed {
            raw_response: raw_body,
            serde_error: e.to_string(),
            status,
        }
    })
}

/// Reads a non-2xx response into an [`ApiError`].
async fn api_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let headers = response.headers().clone();
    let raw_response = response.text().await.unwrap_or_default();

    if status.is_client_error() {
        tracing::error!(
            status = status.as_u16(),
            response = %raw_response,
            "Client error (4xx)"
        );
    } else if status.is_server_error() {
        tracing::warn!(
            status = status.as_u16(),
            response = %raw_response,
            "Server error (5xx)"
        );
    }

    ApiError::from_response(status, headers, raw_response).into()
}

/// Builder for configuring and creating a [`Client`].
///
/// Defaults: 30 second timeout, [`RetryPolicy::default`] (three retries),
/// [`RetryOnTransient`] as the retry predicate, `Content-Type:
/// application/json` and no token provider.
///
/// # Examples
///
/// ```no_run
/// use avaagent_client::{ClientBuilder, RetryPolicy, StaticToken};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), avaagent_client::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://api.example.com/api/v1")?
///     .timeout(Duration::from_secs(15))
///     .retry_policy(
///         RetryPolicy::default()
///             .with_base_delay(Duration::from_millis(250))
///             .with_max_delay(Duration::from_secs(5)),
///     )
///     .token_provider(StaticToken::new("service-token"))
///     .default_header("X-Client", "dashboard")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    default_headers: HeaderMap,
    retry_policy: RetryPolicy,
    retry_predicate: Option<Box<dyn RetryPredicate>>,
    timeout: Duration,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("avaagent-client/", env!("CARGO_PKG_VERSION"))),
        );

        Self {
            base_url: None,
            default_headers,
            retry_policy: RetryPolicy::default(),
            retry_predicate: None,
            timeout: DEFAULT_TIMEOUT,
            token_provider: None,
        }
    }

    /// Creates a builder preloaded from a [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new()
            .base_url(&config.base_url)?
            .default_header(USER_AGENT.as_str(), &config.user_agent)?
            .timeout(config.timeout)
            .retry_policy(config.retry))
    }

    /// Sets the base URL all paths are resolved against.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets a custom retry predicate.
    ///
    /// By default, requests are retried based on `Error::is_retryable()`.
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Sets the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the token provider used for `Authorization: Bearer` headers.
    pub fn token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was provided, the timeout is zero, or
    /// the HTTP client cannot be constructed.
    pub fn build(self) -> Result<Client> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Configuration("Base URL is required".to_string()))?;

        if self.timeout.is_zero() {
            return Err(Error::Configuration("Timeout must be non-zero".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let retry_predicate = self
            .retry_predicate
            .unwrap_or_else(|| Box::new(RetryOnTransient));

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                default_headers: self.default_headers,
                retry_policy: self.retry_policy,
                retry_predicate,
                timeout: self.timeout,
                token_provider: RwLock::new(self.token_provider),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> Client {
        Client::builder().base_url(base).unwrap().build().unwrap()
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let client = client("http://localhost:8000/api/v1");
        let url = client.endpoint_url("/agents", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/agents");

        let client = self::client("http://localhost:8000/api/v1/");
        let url = client.endpoint_url("agents/42", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/agents/42");
    }

    #[test]
    fn test_endpoint_url_query_handling() {
        let client = client("http://localhost:8000/api/v1");
        let query = vec![("limit".to_string(), "10".to_string())];
        let url = client.endpoint_url("/agents?status=active", &query).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/agents?status=active&limit=10"
        );
    }

    #[test]
    fn test_endpoint_url_absolute() {
        let client = client("http://localhost:8000/api/v1");
        let url = client
            .endpoint_url("https://other.example.com/health", &[])
            .unwrap();
        assert_eq!(url.as_str(), "https://other.example.com/health");
    }

    #[test]
    fn test_build_requires_base_url() {
        assert!(matches!(
            Client::builder().build(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_build_rejects_zero_timeout() {
        let result = Client::builder()
            .base_url("http://localhost")
            .unwrap()
            .timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
