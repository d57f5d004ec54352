//! Intent endpoints
//!
//! An intent is a natural-language instruction ("swap 10 AVAX to USDC")
//! that the backend parses into a typed action for one of the user's agents.
//! Executing an intent that changes chain state requires explicit
//! confirmation.

use super::{segment, Acknowledgement};
use crate::{Client, RequestConfig, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Draft,
    Pending,
    Validating,
    Approved,
    Executing,
    Completed,
    Failed,
    Cancelled,
    Expired,
}

impl IntentStatus {
    /// The wire name, as used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::Draft => "draft",
            IntentStatus::Pending => "pending",
            IntentStatus::Validating => "validating",
            IntentStatus::Approved => "approved",
            IntentStatus::Executing => "executing",
            IntentStatus::Completed => "completed",
            IntentStatus::Failed => "failed",
            IntentStatus::Cancelled => "cancelled",
            IntentStatus::Expired => "expired",
        }
    }
}

/// Body for creating an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIntent {
    /// The instruction as the user typed it, 1 to 1000 characters.
    pub raw_input: String,
    pub agent_id: String,
}

impl NewIntent {
    pub fn new(agent_id: impl Into<String>, raw_input: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
            agent_id: agent_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub id: String,
    pub agent_id: String,
    pub raw_input: String,
    /// Parsed action, such as `swap`, `transfer` or `fetch_data`.
    pub intent_type: String,
    #[serde(default)]
    pub parameters: Value,
    pub status: IntentStatus,
    /// Parser confidence in `[0, 1]`.
    pub confidence: f64,
    pub created_at: String,
}

/// The backend's reading of an instruction.
///
/// Returned both by [`IntentsApi::analyze`] and by
/// [`AiApi::analyze_intent`](super::AiApi::analyze_intent); only the former
/// fills in cost and risks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub intent_type: String,
    #[serde(default)]
    pub parameters: Value,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub estimated_cost_usd: Option<f64>,
    #[serde(default)]
    pub risks: Vec<String>,
}

/// Body for [`IntentsApi::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExecuteIntent {
    pub confirm: bool,
    /// Accepted slippage in percent.
    pub slippage_tolerance: f64,
}

impl ExecuteIntent {
    /// A confirmed execution with the backend's default 0.5% slippage.
    pub fn confirmed() -> Self {
        Self {
            confirm: true,
            slippage_tolerance: 0.5,
        }
    }

    pub fn slippage(mut self, percent: f64) -> Self {
        self.slippage_tolerance = percent;
        self
    }
}

impl Default for ExecuteIntent {
    fn default() -> Self {
        Self {
            confirm: false,
            slippage_tolerance: 0.5,
        }
    }
}

/// Outcome of an execution. A failed execution still answers 200.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Filters for [`IntentsApi::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentFilter {
    pub agent_id: Option<String>,
    pub status: Option<IntentStatus>,
    /// Page size; the backend accepts 1 to 100 and defaults to 50.
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl IntentFilter {
    fn apply(&self, mut config: RequestConfig) -> RequestConfig {
        if let Some(agent_id) = &self.agent_id {
            config = config.query("agent_id", agent_id);
        }
        if let Some(status) = self.status {
            config = config.query("status", status.as_str());
        }
        if let Some(limit) = self.limit {
            config = config.query("limit", limit);
        }
        if let Some(offset) = self.offset {
            config = config.query("offset", offset);
        }
        config
    }
}

/// Intent API interface
#[derive(Clone)]
pub struct IntentsApi {
    client: Client,
}

impl IntentsApi {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Parses an instruction and stores it as a pending intent.
    pub async fn create(&self, intent: &NewIntent) -> Result<Intent> {
        self.client.post("/intents/", intent).await
    }

    pub async fn get(&self, intent_id: &str) -> Result<Intent> {
        self.client
            .get(&format!("/intents/{}", segment(intent_id)))
            .await
    }

    /// Lists the current user's intents, newest first.
    pub async fn list(&self, filter: &IntentFilter) -> Result<Vec<Intent>> {
        let config = filter.apply(RequestConfig::new(Method::GET));
        self.client.get_with("/intents/", config).await
    }

    /// Re-analyzes an intent, adding cost estimates and risks.
    pub async fn analyze(&self, intent_id: &str) -> Result<IntentAnalysis> {
        self.client
            .request::<IntentAnalysis>(
                &format!("/intents/{}/analyze", segment(intent_id)),
                RequestConfig::new(Method::POST),
            )
            .await
            .map(crate::Response::into_data)
    }

    /// Executes a pending intent.
    ///
    /// The backend answers 400 unless `execute.confirm` is set.
    pub async fn execute(&self, intent_id: &str, execute: &ExecuteIntent) -> Result<ExecutionResult> {
        self.client
            .post(&format!("/intents/{}/execute", segment(intent_id)), execute)
            .await
    }

    /// Cancels a pending intent.
    pub async fn delete(&self, intent_id: &str) -> Result<Acknowledgement> {
        self.client
            .delete(&format!("/intents/{}", segment(intent_id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_intent_deserialize() {
        let intent: Intent = serde_json::from_value(json!({
            "id": "i-1",
            "agent_id": "a-1",
            "raw_input": "swap 10 AVAX to USDC",
            "intent_type": "swap",
            "parameters": { "from": "AVAX", "to": "USDC", "amount": 10 },
            "status": "pending",
            "confidence": 0.92,
            "created_at": "2024-01-01T00:00:00"
        }))
        .unwrap();

        assert_eq!(intent.status, IntentStatus::Pending);
        assert_eq!(intent.parameters["to"], "USDC");
    }

    #[test]
    fn test_execute_defaults_to_unconfirmed() {
        assert_eq!(
            serde_json::to_value(ExecuteIntent::default()).unwrap(),
            json!({ "confirm": false, "slippage_tolerance": 0.5 })
        );
        assert!(ExecuteIntent::confirmed().slippage(1.0).confirm);
    }

    #[test]
    fn test_filter_builds_query() {
        let filter = IntentFilter {
            agent_id: Some("a-1".to_string()),
            status: Some(IntentStatus::Completed),
            ..Default::default()
        };
        let config = filter.apply(RequestConfig::new(Method::GET));
        assert_eq!(
            config.query_params,
            vec![
                ("agent_id".to_string(), "a-1".to_string()),
                ("status".to_string(), "completed".to_string()),
            ]
        );
    }

    #[test]
    fn test_analysis_without_cost_fields() {
        let analysis: IntentAnalysis = serde_json::from_value(json!({
            "intent_type": "fetch_data",
            "parameters": {},
            "confidence": 0.5,
            "reasoning": "asks for a price"
        }))
        .unwrap();
        assert!(analysis.estimated_cost_usd.is_none());
        assert!(analysis.risks.is_empty());
    }
}
