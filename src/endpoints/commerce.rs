//! Commerce marketplace endpoints
//!
//! Products are real-world goods that an agent can buy with crypto from
//! one of the user's wallets.

use super::{segment, Acknowledgement};
use crate::{Client, RequestConfig, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body for [`CommerceApi::search`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductSearch {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

impl ProductSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restricts results to prices in `[min, max]` USD.
    pub fn price_range(mut self, min: f64, max: f64) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_usd: f64,
    /// Prices per token, keyed by symbol.
    #[serde(default)]
    pub price_crypto: Option<Value>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub merchant: String,
    pub availability: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Body for [`CommerceApi::purchase`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Purchase {
    pub product_id: String,
    /// 1 to 10.
    pub quantity: u32,
    pub shipping_address: Value,
    /// Wallet that pays; it must belong to the current user.
    pub wallet_id: String,
    pub payment_method: String,
}

impl Purchase {
    /// A single-item crypto purchase.
    pub fn new(
        product_id: impl Into<String>,
        wallet_id: impl Into<String>,
        shipping_address: Value,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            quantity: 1,
            shipping_address,
            wallet_id: wallet_id.into(),
            payment_method: "crypto".to_string(),
        }
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Result of a purchase. A rejected order still answers 200 with `status: failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub order_id: String,
    pub status: String,
    pub total_usd: f64,
    pub payment_status: String,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PurchaseReceipt {
    pub fn is_failed(&self) -> bool {
        self.status == "failed" || self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub status: String,
    pub payment_status: String,
    #[serde(default)]
    pub shipping_status: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub items: Vec<Value>,
    pub total_usd: f64,
}

/// Filters for [`CommerceApi::orders`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<String>,
    /// Page size; the backend accepts 1 to 100 and defaults to 20.
    pub limit: Option<u32>,
}

#[derive(Deserialize)]
struct Categories {
    #[serde(default)]
    categories: Vec<Value>,
}

#[derive(Deserialize)]
struct Merchants {
    #[serde(default)]
    merchants: Vec<Value>,
}

/// Commerce API interface
#[derive(Clone)]
pub struct CommerceApi {
    client: Client,
}

impl CommerceApi {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn search(&self, search: &ProductSearch) -> Result<ProductPage> {
        self.client.post("/commerce/search", search).await
    }

    /// Product details, passed through as the merchant describes them.
    pub async fn product(&self, product_id: &str) -> Result<Value> {
        self.client
            .get(&format!("/commerce/product/{}", segment(product_id)))
            .await
    }

    /// Places an order paid from `purchase.wallet_id`.
    pub async fn purchase(&self, purchase: &Purchase) -> Result<PurchaseReceipt> {
        self.client.post("/commerce/purchase", purchase).await
    }

    pub async fn orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let mut config = RequestConfig::new(Method::GET);
        if let Some(status) = &filter.status {
            config = config.query("status", status);
        }
        if let Some(limit) = filter.limit {
            config = config.query("limit", limit);
        }
        self.client.get_with("/commerce/orders", config).await
    }

    pub async fn order(&self, order_id: &str) -> Result<Order> {
        self.client
            .get(&format!("/commerce/orders/{}", segment(order_id)))
            .await
    }

    pub async fn cancel_order(&self, order_id: &str) -> Result<Acknowledgement> {
        self.client
            .request::<Acknowledgement>(
                &format!("/commerce/orders/{}/cancel", segment(order_id)),
                RequestConfig::new(Method::POST),
            )
            .await
            .map(crate::Response::into_data)
    }

    pub async fn categories(&self) -> Result<Vec<Value>> {
        let list: Categories = self.client.get("/commerce/categories").await?;
        Ok(list.categories)
    }

    pub async fn merchants(&self, category: Option<&str>) -> Result<Vec<Value>> {
        let mut config = RequestConfig::new(Method::GET);
        if let Some(category) = category {
            config = config.query("category", category);
        }
        let list: Merchants = self.client.get_with("/commerce/merchants", config).await?;
        Ok(list.merchants)
    }
}
