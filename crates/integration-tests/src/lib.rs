//! Integration tests for the BlockFlow storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p blockflow-integration-tests
//! ```
//!
//! No external services are needed: [`FakeApi`] serves an in-process fake of
//! the BlockFlow REST API on an ephemeral port and records every order
//! request, so tests drive the real `reqwest` client end to end.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use blockflow_storefront::config::StorefrontConfig;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// Password the fake accepts for any username.
pub const PASSWORD: &str = "correct-horse";

/// Token the fake issues and requires on order requests.
pub const TOKEN: &str = "fake.jwt.token";

/// `orderDate` the fake reports for every order.
pub const ORDER_DATE: &str = "2026-03-01T10:15:00";

/// An order the fake accepted. `body` is the last create or update body.
#[derive(Debug, Clone)]
pub struct RecordedOrder {
    pub id: i64,
    pub body: Value,
}

impl RecordedOrder {
    /// The order as the list and update endpoints report it.
    fn listed(&self) -> Value {
        let mut listed = self.body.clone();
        if let Some(object) = listed.as_object_mut() {
            object.insert("id".to_string(), json!(self.id));
            object.insert("orderDate".to_string(), json!(ORDER_DATE));
        }
        listed
    }
}

/// Handle to a running fake API. The server stops when the runtime does.
pub struct FakeApi {
    base_url: Url,
    state: Arc<FakeState>,
}

struct FakeState {
    products: HashMap<i64, Value>,
    failing: Mutex<HashSet<i64>>,
    next_order_id: AtomicI64,
    orders: Mutex<Vec<RecordedOrder>>,
    deleted: Mutex<Vec<i64>>,
    order_requests: AtomicI64,
}

impl FakeApi {
    /// Start a fake API seeded with three products:
    ///
    /// | id | name | price field |
    /// |----|------|-------------|
    /// | 1 | Granite Block | `price: 100` |
    /// | 2 | Oak Beam | `pricePerUnit: "50"` |
    /// | 3 | Clay Brick | `price: "12.50"` |
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let products = [
            json!({"id": 1, "name": "Granite Block", "category": "Stone", "image": "/img/granite.png", "price": 100, "stockQuantity": 40}),
            json!({"id": 2, "name": "Oak Beam", "category": "Timber", "image": "", "price": null, "pricePerUnit": "50", "stockQuantity": 12}),
            json!({"id": 3, "name": "Clay Brick", "category": "Masonry", "price": "12.50", "stockQuantity": 900}),
        ]
        .into_iter()
        .filter_map(|p| Some((p.get("id")?.as_i64()?, p)))
        .collect();

        let state = Arc::new(FakeState {
            products,
            failing: Mutex::new(HashSet::new()),
            next_order_id: AtomicI64::new(1000),
            orders: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            order_requests: AtomicI64::new(0),
        });

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/products/search-advanced", get(search))
            .route("/api/products/categories/all", get(categories))
            .route("/api/products/{id}", get(product))
            .route("/api/orders", post(create_order).get(list_orders))
            .route("/api/orders/{id}", axum::routing::put(update_order).delete(delete_order))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake API listener");
        let addr = listener.local_addr().expect("fake API local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve fake API") });

        let base_url = Url::parse(&format!("http://{addr}")).expect("fake API url");
        Self { base_url, state }
    }

    /// Configuration pointed at this fake, with slots under `data_dir`.
    #[must_use]
    pub fn config(&self, data_dir: &Path) -> StorefrontConfig {
        StorefrontConfig::for_api(self.base_url.clone(), data_dir)
    }

    /// Make order creation fail for a product.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned.
    pub fn fail_orders_for(&self, product_id: i64) {
        self.state
            .failing
            .lock()
            .expect("failing lock")
            .insert(product_id);
    }

    /// Orders that currently exist (created and not deleted).
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned.
    #[must_use]
    pub fn orders(&self) -> Vec<RecordedOrder> {
        self.state.orders.lock().expect("orders lock").clone()
    }

    /// Ids of orders deleted through the API.
    ///
    /// # Panics
    ///
    /// Panics if the state lock is poisoned.
    #[must_use]
    pub fn deleted(&self) -> Vec<i64> {
        let mut deleted = self.state.deleted.lock().expect("deleted lock").clone();
        deleted.sort_unstable();
        deleted
    }

    /// Number of `POST /api/orders` requests received, including rejected ones.
    #[must_use]
    pub fn order_requests(&self) -> i64 {
        self.state.order_requests.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Handlers
// =============================================================================

type Shared = State<Arc<FakeState>>;

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> Response {
    if body.password != PASSWORD {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
    }
    Json(json!({"token": TOKEN, "username": body.username})).into_response()
}

async fn product(State(state): Shared, UrlPath(id): UrlPath<i64>) -> Response {
    match state.products.get(&id) {
        Some(product) => Json(product.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Product not found").into_response(),
    }
}

async fn search(State(state): Shared, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let q = params.get("q").map(|q| q.to_lowercase()).unwrap_or_default();
    let category = params.get("category").cloned().unwrap_or_default();

    let mut content: Vec<Value> = state
        .products
        .values()
        .filter(|p| {
            let name = p.get("name").and_then(Value::as_str).unwrap_or_default();
            name.to_lowercase().contains(&q)
        })
        .filter(|p| {
            category.is_empty()
                || p.get("category").and_then(Value::as_str) == Some(category.as_str())
        })
        .cloned()
        .collect();
    content.sort_by_key(|p| p.get("id").and_then(Value::as_i64));

    Json(json!({"content": content, "totalPages": 1}))
}

async fn categories(State(state): Shared) -> Json<Vec<String>> {
    let mut categories: Vec<String> = state
        .products
        .values()
        .filter_map(|p| p.get("category").and_then(Value::as_str).map(String::from))
        .collect();
    categories.sort();
    Json(categories)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn create_order(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.order_requests.fetch_add(1, Ordering::SeqCst);

    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let product_id = body.get("productId").and_then(Value::as_i64).unwrap_or_default();
    if state.failing.lock().expect("failing lock").contains(&product_id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Insufficient stock").into_response();
    }

    let id = state.next_order_id.fetch_add(1, Ordering::SeqCst);
    let mut created = body.clone();
    if let Some(object) = created.as_object_mut() {
        object.insert("id".to_string(), json!(id));
    }

    state
        .orders
        .lock()
        .expect("orders lock")
        .push(RecordedOrder { id, body });

    (StatusCode::CREATED, Json(created)).into_response()
}

async fn list_orders(State(state): Shared, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let orders = state.orders.lock().expect("orders lock");
    Json(orders.iter().map(RecordedOrder::listed).collect::<Vec<_>>()).into_response()
}

async fn update_order(
    State(state): Shared,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let mut orders = state.orders.lock().expect("orders lock");
    let Some(order) = orders.iter_mut().find(|order| order.id == id) else {
        return (StatusCode::NOT_FOUND, "Order not found").into_response();
    };

    if let (Some(stored), Some(update)) = (order.body.as_object_mut(), body.as_object()) {
        for (key, value) in update {
            stored.insert(key.clone(), value.clone());
        }
    }

    Json(order.listed()).into_response()
}

async fn delete_order(State(state): Shared, headers: HeaderMap, UrlPath(id): UrlPath<i64>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let mut orders = state.orders.lock().expect("orders lock");
    let before = orders.len();
    orders.retain(|order| order.id != id);
    if orders.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    drop(orders);

    state.deleted.lock().expect("deleted lock").push(id);
    StatusCode::NO_CONTENT.into_response()
}
