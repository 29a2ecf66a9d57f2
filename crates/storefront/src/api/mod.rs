//! BlockFlow REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTPS with `reqwest`; one shared connection pool per
//!   process (the client is cheaply cloneable via `Arc`)
//! - The remote API is the source of truth for products and orders - NO local
//!   sync, direct API calls
//! - In-memory caching via `moka` for product and category reads (TTL from
//!   config, 5 minutes by default)
//!
//! # Endpoints
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | `POST` | `/api/auth/login` | - |
//! | `GET` | `/api/products/{id}` | - |
//! | `GET` | `/api/products/search-advanced` | - |
//! | `GET` | `/api/products/categories/all` | - |
//! | `POST` | `/api/orders` | Bearer |
//! | `GET` | `/api/orders` | Bearer |
//! | `PUT` | `/api/orders/{id}` | Bearer |
//! | `DELETE` | `/api/orders/{id}` | Bearer |

mod cache;
pub mod conversions;
pub mod types;

pub use conversions::ProductError;
pub use types::*;

use std::sync::Arc;

use blockflow_core::{OrderId, ProductId};
use moka::future::Cache;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;
use crate::models::Product;
use crate::services::auth::AuthToken;
use crate::services::checkout::OrderApi;

use cache::{CATEGORIES_KEY, CacheValue, product_key};
use conversions::convert_product_page;

/// Errors that can occur when talking to the BlockFlow API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Missing, expired, or rejected bearer token (401/403).
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

// =============================================================================
// BlockflowClient
// =============================================================================

/// Client for the BlockFlow REST API.
#[derive(Clone)]
pub struct BlockflowClient {
    inner: Arc<BlockflowClientInner>,
}

struct BlockflowClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl BlockflowClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(BlockflowClientInner {
                client,
                base_url: config.api_url.clone(),
                cache,
            }),
        })
    }

    /// Resolve an API path (without leading slash) against the base URL.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials, or another
    /// variant if the request fails.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("api/auth/login")?)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        handle_response(response).await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Get a single product, normalized for the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist, fails normalization,
    /// or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = product_key(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let response = self
            .inner
            .client
            .get(self.url(&format!("api/products/{id}"))?)
            .send()
            .await?;

        let raw: CatalogProduct = handle_response(response).await.map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::NotFound(format!("Product not found: {id}")),
            other => other,
        })?;

        let product = raw
            .normalize()
            .map_err(|e| ApiError::Parse(format!("Product {id}: {e}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Search the catalog. Search results are not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the page cannot be parsed.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let mut url = self.url("api/products/search-advanced")?;
        url.query_pairs_mut().extend_pairs(query.pairs());

        let response = self.inner.client.get(url).send().await?;
        let raw: RawProductPage = handle_response(response).await?;

        Ok(convert_product_page(raw, query.page))
    }

    /// List product categories.
    ///
    /// Categories only drive filtering, so failures degrade to an empty list
    /// instead of an error.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Vec<String> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(CATEGORIES_KEY).await
        {
            debug!("Cache hit for categories");
            return categories;
        }

        match self.fetch_categories().await {
            Ok(categories) => {
                self.inner
                    .cache
                    .insert(
                        CATEGORIES_KEY.to_string(),
                        CacheValue::Categories(categories.clone()),
                    )
                    .await;
                categories
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch categories");
                Vec::new()
            }
        }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List the orders visible to the token. Never cached.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the token is rejected, or another
    /// variant if the request fails or the body cannot be parsed.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("api/orders")?)
            .bearer_auth(token.expose())
            .send()
            .await?;

        let orders: Option<Vec<Order>> = handle_response(response).await?;
        Ok(orders.unwrap_or_default())
    }

    /// Replace an order's editable fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the order does not exist, or another
    /// variant if the request fails.
    #[instrument(skip(self, token, update), fields(order_id = %id, status = %update.status))]
    pub async fn update_order(
        &self,
        token: &AuthToken,
        id: OrderId,
        update: &OrderUpdate,
    ) -> Result<Order, ApiError> {
        let response = self
            .inner
            .client
            .put(self.url(&format!("api/orders/{id}"))?)
            .bearer_auth(token.expose())
            .json(update)
            .send()
            .await?;

        handle_response(response).await.map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::NotFound(format!("Order not found: {id}")),
            other => other,
        })
    }
}

impl BlockflowClient {
    async fn fetch_categories(&self) -> Result<Vec<String>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("api/products/categories/all")?)
            .send()
            .await?;

        let categories: Option<Vec<String>> = handle_response(response).await?;
        Ok(categories.unwrap_or_default())
    }
}

impl OrderApi for BlockflowClient {
    #[instrument(skip(self, token, order), fields(product_id = %order.product_id, quantity = order.quantity))]
    async fn create_order(
        &self,
        token: &AuthToken,
        order: &NewOrder,
    ) -> Result<CreatedOrder, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("api/orders")?)
            .bearer_auth(token.expose())
            .json(order)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(parse_error(response).await);
        }

        // The echo is informational; an empty or non-JSON body still means
        // the order exists.
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(CreatedOrder::from_body(body))
    }

    #[instrument(skip(self, token), fields(order_id = %id))]
    async fn delete_order(&self, token: &AuthToken, id: OrderId) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.url(&format!("api/orders/{id}"))?)
            .bearer_auth(token.expose())
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(parse_error(response).await)
    }
}

impl std::fmt::Debug for BlockflowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockflowClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Response handling
// =============================================================================

/// Handle API response and parse JSON.
async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    if response.status().is_success() {
        return response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")));
    }

    Err(parse_error(response).await)
}

/// Map a non-success response onto an [`ApiError`].
async fn parse_error(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);
        return ApiError::RateLimited(retry_after);
    }

    if status == 401 || status == 403 {
        return ApiError::Unauthorized;
    }

    if status == 404 {
        return ApiError::NotFound(response.url().path().to_string());
    }

    let message = response
        .text()
        .await
        .map(|body| body.chars().take(200).collect::<String>())
        .unwrap_or_else(|_| "Unknown error".to_string());

    tracing::error!(status, body = %message, "BlockFlow API returned non-success status");

    ApiError::Api { status, message }
}
