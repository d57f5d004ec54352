//! # avaagent-client - resilient HTTP client for the AvaAgent backend
//!
//! A typed, retry-aware client for the AvaAgent REST API, built on top of
//! `reqwest`. Every attempt is bounded by a timeout, transient failures are
//! retried with exponential backoff and jitter, bearer tokens are injected
//! from a pluggable provider, and every failure surfaces as one [`Error`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use avaagent_client::endpoints::agents::{AgentType, NewAgent};
//! use avaagent_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), avaagent_client::Error> {
//!     // Reads AVAAGENT_API_URL / NEXT_PUBLIC_API_URL / API_URL
//!     let client = Client::from_env()?;
//!     client.set_token_provider(|| async { std::env::var("AVAAGENT_TOKEN").ok() });
//!
//!     let agent = client
//!         .agents()
//!         .create(&NewAgent::new("Treasury bot").agent_type(AgentType::Treasury))
//!         .await?;
//!     println!("Created agent {}", agent.id);
//!
//!     // Raw JSON works too
//!     let info: serde_json::Value = client.get("/info").await?;
//!     println!("Backend: {}", info["name"]);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Retries
//!
//! Responses with status 408, 429 or 5xx and transport errors are retried up
//! to [`RetryPolicy::max_retries`] times (3 by default). The wait before retry
//! `n` is `min(base_delay * 2^(n-1), max_delay)` plus up to one second of
//! jitter. An attempt that runs out of time is *not* retried: it ends the call
//! with [`Error::Timeout`], which reports status 408.
//!
//! ## Error Handling
//!
//! ```no_run
//! use avaagent_client::{Client, Error};
//!
//! # async fn example(client: Client) {
//! match client.agents().get("missing").await {
//!     Ok(agent) => println!("Found {}", agent.name),
//!     Err(Error::Api(err)) if err.status().as_u16() == 404 => {
//!         eprintln!("Not found: {}", err.message());
//!     }
//!     Err(e) => eprintln!("Request failed: {}", e.message()),
//! }
//! # }
//! ```

pub mod auth;
mod client;
pub mod config;
pub mod endpoints;
mod error;
mod request;
mod response;
pub mod retry;
pub mod stream;

pub use auth::{StaticToken, TokenProvider};
pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use error::{ApiError, Error, Result};
pub use request::RequestConfig;
pub use response::Response;
pub use retry::{RetryPolicy, RetryPredicate};
pub use stream::TextStream;
