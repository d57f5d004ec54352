//! Wallet, policy and spend-limit endpoints
//!
//! Policies and spend limits are the guardrails the backend enforces before
//! an agent's wallet signs anything.

use super::segment;
use crate::{Client, RequestConfig, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
    /// Account-abstraction smart wallet
    #[default]
    Erc4337,
    /// Externally owned account
    Eoa,
    Multisig,
    KiteHierarchical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainNetwork {
    AvalancheMainnet,
    #[default]
    AvalancheFuji,
    KiteTestnet,
    KiteMainnet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    /// Only listed addresses may receive funds
    Allowlist,
    /// Listed addresses may never receive funds
    Blocklist,
    ContractCall,
    TimeBased,
    Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendLimitPeriod {
    PerTransaction,
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

/// Body for creating a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewWallet {
    pub agent_id: String,
    pub label: String,
    pub wallet_type: WalletType,
    pub chain_network: ChainNetwork,
    pub is_primary: bool,
}

impl NewWallet {
    /// A non-primary ERC-4337 wallet on Fuji labelled "Primary", matching the backend defaults.
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            label: "Primary".to_string(),
            wallet_type: WalletType::default(),
            chain_network: ChainNetwork::default(),
            is_primary: false,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn network(mut self, network: ChainNetwork) -> Self {
        self.chain_network = network;
        self
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub address: String,
    pub wallet_type: WalletType,
    pub chain_network: ChainNetwork,
    pub agent_id: String,
    pub label: String,
    pub is_primary: bool,
    pub is_active: bool,
    /// Wei amounts are decimal strings; they do not fit in an f64.
    pub native_balance_wei: String,
    pub usdc_balance_wei: String,
    pub created_at: String,
}

/// On-chain balance snapshot. Token entries are passed through as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub network: String,
    pub address: String,
    pub native: Value,
    #[serde(default)]
    pub usdc: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPolicy {
    pub name: String,
    pub policy_type: PolicyType,
    pub config: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: i32,
}

impl NewPolicy {
    pub fn new(name: impl Into<String>, policy_type: PolicyType, config: Value) -> Self {
        Self {
            name: name.into(),
            policy_type,
            config,
            description: None,
            priority: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub policy_type: PolicyType,
    pub config: Value,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpendLimitUpdate {
    pub period: SpendLimitPeriod,
    pub max_amount_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendLimit {
    pub id: String,
    pub period: SpendLimitPeriod,
    pub max_amount_usd: f64,
    pub current_spent_usd: f64,
    pub remaining_usd: f64,
    pub is_active: bool,
}

impl SpendLimit {
    /// Share of the limit already spent, in `[0, 1]`. A zero limit counts as exhausted.
    pub fn utilization(&self) -> f64 {
        if self.max_amount_usd <= 0.0 {
            return 1.0;
        }
        (self.current_spent_usd / self.max_amount_usd).clamp(0.0, 1.0)
    }
}

/// Wallet API interface
#[derive(Clone)]
pub struct WalletsApi {
    client: Client,
}

impl WalletsApi {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a wallet for one of the user's agents.
    pub async fn create(&self, wallet: &NewWallet) -> Result<Wallet> {
        self.client.post("/wallets", wallet).await
    }

    pub async fn get(&self, wallet_id: &str) -> Result<Wallet> {
        self.client.get(&format!("/wallets/{}", segment(wallet_id))).await
    }

    /// Fetches the balance. With `sync` the backend refreshes it from chain first.
    pub async fn balance(&self, wallet_id: &str, sync: bool) -> Result<Balance> {
        let mut config = RequestConfig::new(Method::GET);
        if sync {
            config = config.query("sync", true);
        }
        self.client
            .get_with(&format!("/wallets/{}/balance", segment(wallet_id)), config)
            .await
    }

    pub async fn create_policy(&self, wallet_id: &str, policy: &NewPolicy) -> Result<Policy> {
        self.client
            .post(&format!("/wallets/{}/policies", segment(wallet_id)), policy)
            .await
    }

    pub async fn list_policies(&self, wallet_id: &str) -> Result<Vec<Policy>> {
        self.client
            .get(&format!("/wallets/{}/policies", segment(wallet_id)))
            .await
    }

    /// Removes a policy. The backend answers `204 No Content`.
    pub async fn delete_policy(&self, wallet_id: &str, policy_id: &str) -> Result<()> {
        self.client
            .delete(&format!("/wallets/{}/policies/{}", segment(wallet_id), segment(policy_id)))
            .await
    }

    /// Creates or replaces the limit for `limit.period`.
    pub async fn set_spend_limit(
        &self,
        wallet_id: &str,
        limit: &SpendLimitUpdate,
    ) -> Result<SpendLimit> {
        self.client
            .put(&format!("/wallets/{}/spend-limits", segment(wallet_id)), limit)
            .await
    }

    pub async fn list_spend_limits(&self, wallet_id: &str) -> Result<Vec<SpendLimit>> {
        self.client
            .get(&format!("/wallets/{}/spend-limits", segment(wallet_id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_wallet_defaults() {
        let body = serde_json::to_value(NewWallet::new("agent-1")).unwrap();
        assert_eq!(
            body,
            json!({
                "agent_id": "agent-1",
                "label": "Primary",
                "wallet_type": "erc4337",
                "chain_network": "avalanche_fuji",
                "is_primary": false
            })
        );
    }

    #[test]
    fn test_spend_limit_utilization() {
        let mut limit = SpendLimit {
            id: "sl-1".to_string(),
            period: SpendLimitPeriod::Daily,
            max_amount_usd: 200.0,
            current_spent_usd: 50.0,
            remaining_usd: 150.0,
            is_active: true,
        };
        assert_eq!(limit.utilization(), 0.25);

        limit.max_amount_usd = 0.0;
        assert_eq!(limit.utilization(), 1.0);
    }

    #[test]
    fn test_policy_type_wire_names() {
        assert_eq!(
            serde_json::to_value(PolicyType::ContractCall).unwrap(),
            json!("contract_call")
        );
        let period: SpendLimitPeriod = serde_json::from_value(json!("per_transaction")).unwrap();
        assert_eq!(period, SpendLimitPeriod::PerTransaction);
    }
}
