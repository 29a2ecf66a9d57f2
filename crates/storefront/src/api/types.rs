//! Wire types for the BlockFlow REST API.
//!
//! These mirror the JSON the API sends and accepts. Catalog responses are
//! deliberately loose (`serde_json::Value` for prices) and are turned into
//! canonical [`crate::models::Product`] values by the conversions module.

use std::num::NonZeroU32;

use blockflow_core::{OrderId, OrderStatus, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Product;

// =============================================================================
// Catalog
// =============================================================================

/// A product as the catalog endpoints return it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Unit price, number or string. Older records use `pricePerUnit`.
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub price_per_unit: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
}

/// Raw page returned by `GET /api/products/search-advanced`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProductPage {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default)]
    pub total_pages: u32,
}

/// A page of normalized products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Zero-based page index that was requested.
    pub page: u32,
    pub total_pages: u32,
}

/// Parameters for the advanced product search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Free-text query.
    pub q: String,
    /// Category filter; empty means all categories.
    pub category: String,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub sort_by: String,
    /// Zero-based page index.
    pub page: u32,
    pub limit: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            category: String::new(),
            min_price: Decimal::ZERO,
            max_price: Decimal::from(1000),
            sort_by: "id".to_string(),
            page: 0,
            limit: 12,
        }
    }
}

impl ProductQuery {
    /// Query-string pairs in the order the API documents them.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("q", self.q.clone()),
            ("category", self.category.clone()),
            ("minPrice", self.min_price.to_string()),
            ("maxPrice", self.max_price.to_string()),
            ("sortBy", self.sort_by.clone()),
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Body of `POST /api/auth/login`.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /api/auth/login`.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .finish()
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Body of `POST /api/orders`: one order per cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub product_id: ProductId,
    pub quantity: u32,
    pub customer_name: String,
    pub status: OrderStatus,
    /// `price × quantity` for the line, sent as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

/// The order echoed back by `POST /api/orders`.
///
/// Only the id is interpreted (it is needed to cancel the order if the rest
/// of the checkout fails); the full body is kept for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedOrder {
    pub id: Option<OrderId>,
    pub body: Value,
}

impl CreatedOrder {
    /// Interpret a response body. An empty or non-object body still counts as
    /// a created order; it just cannot be referenced later.
    #[must_use]
    pub fn from_body(body: Value) -> Self {
        let id = body.get("id").and_then(Value::as_i64).map(OrderId::new);
        Self { id, body }
    }
}

/// An order as `GET /api/orders` and `PUT /api/orders/{id}` return it.
///
/// Only the id is required; orders created by other tools may lack any of
/// the other fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// Server-local timestamp, passed through as sent.
    #[serde(default)]
    pub order_date: Option<String>,
}

impl Order {
    /// The full `PUT` body for this order with `changes` applied.
    ///
    /// Returns `None` if the order has no product id, or no quantity and the
    /// changes do not supply one.
    #[must_use]
    pub fn with_changes(&self, changes: OrderChanges) -> Option<OrderUpdate> {
        Some(OrderUpdate {
            product_id: self.product_id?,
            customer_name: changes
                .customer_name
                .or_else(|| self.customer_name.clone())
                .unwrap_or_default(),
            quantity: changes.quantity.map(NonZeroU32::get).or(self.quantity)?,
            status: changes.status.or(self.status).unwrap_or_default(),
        })
    }
}

/// Body of `PUT /api/orders/{id}`. The endpoint replaces every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub product_id: ProductId,
    pub customer_name: String,
    pub quantity: u32,
    pub status: OrderStatus,
}

/// Fields to change on an existing order; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderChanges {
    pub customer_name: Option<String>,
    pub quantity: Option<NonZeroU32>,
    pub status: Option<OrderStatus>,
}

impl OrderChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.customer_name.is_none() && self.quantity.is_none() && self.status.is_none()
    }
}
