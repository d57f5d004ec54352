//! Agent endpoints

use super::segment;
use crate::{Client, RequestConfig, Response, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Agent operational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Draft,
    Active,
    Paused,
    Suspended,
    Archived,
}

impl AgentStatus {
    /// The wire name, as used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Draft => "draft",
            AgentStatus::Active => "active",
            AgentStatus::Paused => "paused",
            AgentStatus::Suspended => "suspended",
            AgentStatus::Archived => "archived",
        }
    }
}

/// Kind of work an agent is set up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Trading,
    Treasury,
    DataAnalyst,
    Purchasing,
    Defi,
    #[default]
    Custom,
}

impl AgentType {
    /// The wire name, as used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Trading => "trading",
            AgentType::Treasury => "treasury",
            AgentType::DataAnalyst => "data_analyst",
            AgentType::Purchasing => "purchasing",
            AgentType::Defi => "defi",
            AgentType::Custom => "custom",
        }
    }
}

/// An agent as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub agent_type: AgentType,
    pub status: AgentStatus,
    pub owner_id: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub ai_model: String,
    #[serde(default)]
    pub reputation_score: i64,
    #[serde(default)]
    pub total_transactions: i64,
    #[serde(default)]
    pub total_volume_usd: i64,
    #[serde(default)]
    pub success_rate: i64,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub can_trade: bool,
    #[serde(default)]
    pub can_purchase: bool,
    #[serde(default)]
    pub can_access_data: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A page of agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentList {
    pub agents: Vec<Agent>,
    pub total: u64,
}

/// Body for creating an agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewAgent {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub agent_type: AgentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl NewAgent {
    /// A custom agent with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn agent_type(mut self, agent_type: AgentType) -> Self {
        self.agent_type = agent_type;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.capabilities = Some(capabilities.into_iter().map(Into::into).collect());
        self
    }
}

/// Partial update for an agent. Only fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_trade: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_purchase: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_access_data: Option<bool>,
}

/// Filters for [`AgentsApi::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentFilter {
    pub status: Option<AgentStatus>,
    pub agent_type: Option<AgentType>,
    /// Page size; the backend accepts 1 to 100 and defaults to 50.
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl AgentFilter {
    fn apply(&self, mut config: RequestConfig) -> RequestConfig {
        if let Some(status) = self.status {
            config = config.query("status", status.as_str());
        }
        if let Some(agent_type) = self.agent_type {
            config = config.query("agent_type", agent_type.as_str());
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

/// Agent API interface
#[derive(Clone)]
pub struct AgentsApi {
    client: Client,
}

impl AgentsApi {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates an agent.
    pub async fn create(&self, agent: &NewAgent) -> Result<Agent> {
        self.client.post("/agents", agent).await
    }

    /// Lists the current user's agents.
    pub async fn list(&self, filter: &AgentFilter) -> Result<AgentList> {
        let config = filter.apply(RequestConfig::new(Method::GET));
        self.client.get_with("/agents", config).await
    }

    /// Fetches one agent.
    pub async fn get(&self, agent_id: &str) -> Result<Agent> {
        self.client.get(&format!("/agents/{}", segment(agent_id))).await
    }

    /// Applies a partial update.
    pub async fn update(&self, agent_id: &str, update: &AgentUpdate) -> Result<Agent> {
        self.client
            .patch(&format!("/agents/{}", segment(agent_id)), update)
            .await
    }

    /// Moves an agent to `active`.
    pub async fn activate(&self, agent_id: &str) -> Result<Agent> {
        self.transition(agent_id, "activate").await
    }

    /// Moves an active agent to `paused`.
    pub async fn pause(&self, agent_id: &str) -> Result<Agent> {
        self.transition(agent_id, "pause").await
    }

    /// Archives an agent. The backend answers `204 No Content`.
    pub async fn delete(&self, agent_id: &str) -> Result<()> {
        self.client.delete(&format!("/agents/{}", segment(agent_id))).await
    }

    async fn transition(&self, agent_id: &str, action: &str) -> Result<Agent> {
        self.client
            .request::<Agent>(
                &format!("/agents/{}/{action}", segment(agent_id)),
                RequestConfig::new(Method::POST),
            )
            .await
            .map(Response::into_data)
    }
}
