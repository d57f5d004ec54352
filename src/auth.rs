//! Bearer-token providers.
//!
//! The client asks its [`TokenProvider`] for a token once per call and sends
//! it as `Authorization: Bearer <token>`. A provider that yields `None` (for
//! example, no signed-in user) simply results in no header.

use crate::Result;
use std::future::Future;
use std::pin::Pin;

/// The future returned by [`TokenProvider::token`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + 'a>>;

/// Supplies the current bearer token.
///
/// Any `Fn() -> impl Future<Output = Option<String>>` closure is a provider:
///
/// ```no_run
/// use avaagent_client::Client;
///
/// # fn example() -> Result<(), avaagent_client::Error> {
/// let client = Client::builder()
///     .base_url("http://localhost:8000/api/v1")?
///     .token_provider(|| async { Some("session-token".to_string()) })
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// Implement the trait directly when fetching a token can fail; returning an
/// error aborts the call with that error.
pub trait TokenProvider: Send + Sync {
    /// Returns the token to send, or `None` to send no `Authorization` header.
    fn token(&self) -> TokenFuture<'_>;
}

impl<F, Fut> TokenProvider for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Option<String>> + Send + 'static,
{
    fn token(&self) -> TokenFuture<'_> {
        let fut = self();
        Box::pin(async move { Ok(fut.await) })
    }
}

/// A provider that always returns the same token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Creates a provider for `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticToken").field(&"<redacted>").finish()
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> TokenFuture<'_> {
        Box::pin(async move { Ok(Some(self.0.clone())) })
    }
}
