//! Market data endpoints
//!
//! Provider failures are reported in the `error` field of a 200 response,
//! not as an HTTP error, so callers should check it.

use super::{comma_list, segment};
use crate::{Client, RequestConfig, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body for [`DataApi::query`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQuery {
    /// Natural-language question, routed to the best source.
    pub query: String,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    pub use_cache: bool,
}

impl DataQuery {
    /// A cached `price` query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            data_type: "price".to_string(),
            parameters: None,
            use_cache: true,
        }
    }

    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    pub fn parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQueryResult {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub cost_usd: f64,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default)]
    pub verification_hash: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Options for [`DataApi::price`]. The backend quotes in USD over 24h by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceQuery {
    pub quote: Option<String>,
    pub include_history: bool,
    pub history_period: Option<String>,
}

impl PriceQuery {
    fn apply(&self, mut config: RequestConfig) -> RequestConfig {
        if let Some(quote) = &self.quote {
            config = config.query("quote", quote);
        }
        if self.include_history {
            config = config.query("include_history", true);
        }
        if let Some(period) = &self.history_period {
            config = config.query("history_period", period);
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub asset: String,
    pub quote: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub change_24h: Option<f64>,
    #[serde(default)]
    pub high_24h: Option<f64>,
    #[serde(default)]
    pub low_24h: Option<f64>,
    #[serde(default)]
    pub volume_24h: Option<f64>,
    #[serde(default)]
    pub history: Option<Vec<Value>>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldOpportunity {
    pub protocol: String,
    pub pool: String,
    pub apy: f64,
    pub tvl_usd: f64,
    /// 1 (safest) to 10.
    pub risk_score: i32,
    pub asset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Yields {
    pub opportunities: Vec<YieldOpportunity>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl Yields {
    /// The opportunity with the highest APY, if any.
    pub fn best(&self) -> Option<&YieldOpportunity> {
        self.opportunities
            .iter()
            .max_by(|a, b| a.apy.total_cmp(&b.apy))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Bearish,
    Neutral,
    Bullish,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub topic: String,
    /// From -1 (bearish) to 1 (bullish).
    pub overall_sentiment: f64,
    pub sentiment_label: SentimentLabel,
    pub volume: u64,
    pub sources_analyzed: u64,
    #[serde(default)]
    pub breakdown: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnChainMetrics {
    pub network: String,
    #[serde(default)]
    pub metrics: Value,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSources {
    pub data_type: String,
    #[serde(default)]
    pub sources: Vec<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Market data API interface
#[derive(Clone)]
pub struct DataApi {
    client: Client,
}

impl DataApi {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn query(&self, query: &DataQuery) -> Result<DataQueryResult> {
        self.client.post("/data/query", query).await
    }

    /// Current price of `asset`, e.g. `AVAX`.
    pub async fn price(&self, asset: &str, options: &PriceQuery) -> Result<Price> {
        let config = options.apply(RequestConfig::new(Method::GET));
        self.client
            .get_with(&format!("/data/price/{}", segment(asset)), config)
            .await
    }

    /// Yield opportunities for `asset`. An empty `protocols` means all of them.
    pub async fn yields(
        &self,
        asset: &str,
        protocols: &[&str],
        min_tvl_usd: Option<u64>,
    ) -> Result<Yields> {
        let mut config = RequestConfig::new(Method::GET);
        if !protocols.is_empty() {
            config = config.query("protocols", comma_list(protocols));
        }
        if let Some(min_tvl) = min_tvl_usd {
            config = config.query("min_tvl", min_tvl);
        }
        self.client
            .get_with(&format!("/data/yields/{}", segment(asset)), config)
            .await
    }

    /// Social and news sentiment for `topic` over `timeframe` (default `24h`).
    pub async fn sentiment(
        &self,
        topic: &str,
        sources: &[&str],
        timeframe: Option<&str>,
    ) -> Result<Sentiment> {
        let mut config = RequestConfig::new(Method::GET);
        if !sources.is_empty() {
            config = config.query("sources", comma_list(sources));
        }
        if let Some(timeframe) = timeframe {
            config = config.query("timeframe", timeframe);
        }
        self.client
            .get_with(&format!("/data/sentiment/{}", segment(topic)), config)
            .await
    }

    pub async fn on_chain(&self, network: &str, metrics: &[&str]) -> Result<OnChainMetrics> {
        let mut config = RequestConfig::new(Method::GET);
        if !metrics.is_empty() {
            config = config.query("metrics", comma_list(metrics));
        }
        self.client
            .get_with(&format!("/data/on-chain/{}", segment(network)), config)
            .await
    }

    /// Providers that serve `data_type`.
    pub async fn sources(&self, data_type: &str) -> Result<DataSources> {
        let config = RequestConfig::new(Method::GET).query("data_type", data_type);
        self.client.get_with("/data/sources", config).await
    }
}
