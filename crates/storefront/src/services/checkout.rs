//! Checkout orchestration.
//!
//! A [`CheckoutFlow`] walks `Cart → Checkout → Completed`. Submitting in the
//! `Checkout` step validates the form, requires a stored bearer token, then
//! creates one remote order per cart line. All per-line requests are issued
//! at once and awaited together.
//!
//! The order API has no multi-line endpoint, so a partial failure can leave
//! some orders created. With rollback enabled those orders are deleted again
//! before the failure is reported.

use std::fmt;
use std::str::FromStr;

use blockflow_core::{OrderId, OrderStatus};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::{ApiError, CreatedOrder, NewOrder};
use crate::cart::CartStore;
use crate::models::Cart;
use crate::pricing::{CartTotals, PricingError, compute_totals};
use crate::services::auth::{AuthToken, CredentialStore};

/// Shown when any required checkout field is empty.
pub const VALIDATION_MESSAGE: &str = "Please fill in all fields";
/// Shown when checkout is attempted without a stored token.
pub const LOGIN_REQUIRED_MESSAGE: &str = "You must be logged in to place an order.";
/// Shown after every line was ordered.
pub const SUCCESS_MESSAGE: &str =
    "Order placed successfully! Order confirmation sent to your email.";
/// Shown when any line failed.
pub const FAILURE_MESSAGE: &str = "Failed to place order. Please try again.";

/// The remote order endpoint.
#[allow(async_fn_in_trait)]
pub trait OrderApi {
    /// Create one order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order was not created.
    async fn create_order(
        &self,
        token: &AuthToken,
        order: &NewOrder,
    ) -> Result<CreatedOrder, ApiError>;

    /// Delete a previously created order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order could not be deleted.
    async fn delete_order(&self, token: &AuthToken, id: OrderId) -> Result<(), ApiError>;
}

/// Errors for operations that are not valid in the current state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    /// Checkout needs at least one cart line.
    #[error("cart is empty")]
    EmptyCart,

    /// `submit` was called outside the checkout step.
    #[error("not in checkout")]
    NotInCheckout,

    /// The cart cannot be totalled.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

// =============================================================================
// Form
// =============================================================================

/// How the customer intends to pay. Collected but not sent to the order API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Upi,
    Bank,
}

impl PaymentMethod {
    /// Wire/CLI name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Upi => "upi",
            Self::Bank => "bank",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(Self::Card),
            "upi" => Ok(Self::Upi),
            "bank" => Ok(Self::Bank),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Shipping and billing details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// Check that every required field has a non-blank value.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming every blank field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<&'static str> = [
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("postalCode", &self.postal_code),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }
}

/// One or more required fields were blank.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Please fill in all fields")]
pub struct ValidationError {
    /// Form field names, in form order.
    pub missing: Vec<&'static str>,
}

// =============================================================================
// Outcomes
// =============================================================================

/// Checkout step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutStep {
    #[default]
    Cart,
    Checkout,
    Completed,
}

/// Where the front-end should go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Home,
    Login,
}

/// Every line was ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub attempt_id: Uuid,
    pub orders: Vec<CreatedOrder>,
    pub placed_at: DateTime<Utc>,
    /// Totals of the cart that was ordered.
    pub totals: CartTotals,
}

/// At least one line failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutFailure {
    pub attempt_id: Uuid,
    /// Lines whose order request failed.
    pub failed: usize,
    /// Lines the server reported as created.
    pub created: usize,
    /// Created orders that were deleted again.
    pub rolled_back: usize,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    Completed(CheckoutReceipt),
    Invalid(ValidationError),
    LoginRequired,
    Failed(CheckoutFailure),
}

impl CheckoutOutcome {
    /// The single message to show the user.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Completed(_) => SUCCESS_MESSAGE,
            Self::Invalid(_) => VALIDATION_MESSAGE,
            Self::LoginRequired => LOGIN_REQUIRED_MESSAGE,
            Self::Failed(_) => FAILURE_MESSAGE,
        }
    }

    /// Navigation the front-end should perform, if any.
    #[must_use]
    pub const fn navigation(&self) -> Option<Navigation> {
        match self {
            Self::Completed(_) => Some(Navigation::Home),
            Self::LoginRequired => Some(Navigation::Login),
            Self::Invalid(_) | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

// =============================================================================
// CheckoutFlow
// =============================================================================

/// Checkout state machine.
#[derive(Debug, Clone, Default)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    last_error: Option<&'static str>,
    rollback: bool,
}

impl CheckoutFlow {
    /// Start in the cart step.
    ///
    /// With `rollback` set, orders created by a partially failed submit are
    /// deleted again.
    #[must_use]
    pub const fn new(rollback: bool) -> Self {
        Self {
            step: CheckoutStep::Cart,
            last_error: None,
            rollback,
        }
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Message of the last unsuccessful submit, cleared on navigation.
    #[must_use]
    pub const fn last_error(&self) -> Option<&'static str> {
        self.last_error
    }

    /// Move to the checkout step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if the cart has no lines.
    pub fn proceed(&mut self, cart: &Cart) -> Result<(), CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.step = CheckoutStep::Checkout;
        self.last_error = None;
        Ok(())
    }

    /// Return to the cart step. No other state changes.
    pub fn back(&mut self) {
        self.step = CheckoutStep::Cart;
        self.last_error = None;
    }

    /// Submit the form.
    ///
    /// Validation failure and a missing token make no network calls. When
    /// every line is ordered the cart is cleared and the flow completes;
    /// otherwise the cart is kept and the flow stays in checkout.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] if called outside the checkout step, with an
    /// empty cart, or with a cart whose totals overflow. Every other failure
    /// is reported as an outcome.
    #[instrument(skip_all, fields(attempt_id = tracing::field::Empty))]
    pub async fn submit<A: OrderApi>(
        &mut self,
        form: &CheckoutForm,
        cart: &mut CartStore,
        credentials: &CredentialStore,
        api: &A,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if self.step != CheckoutStep::Checkout {
            return Err(CheckoutError::NotInCheckout);
        }

        let snapshot = cart.snapshot();
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let totals = compute_totals(&snapshot)?;

        if let Err(e) = form.validate() {
            tracing::debug!(missing = ?e.missing, "Checkout form incomplete");
            self.last_error = Some(VALIDATION_MESSAGE);
            return Ok(CheckoutOutcome::Invalid(e));
        }

        let Some(token) = credentials.token() else {
            tracing::warn!("Checkout attempted without a stored token");
            self.last_error = Some(LOGIN_REQUIRED_MESSAGE);
            return Ok(CheckoutOutcome::LoginRequired);
        };

        let attempt_id = Uuid::new_v4();
        tracing::Span::current().record("attempt_id", tracing::field::display(attempt_id));

        let orders = order_lines(&snapshot, &form.full_name)?;
        info!(lines = orders.len(), "Submitting orders");

        let results = join_all(orders.iter().map(|order| api.create_order(&token, order))).await;

        let mut created = Vec::with_capacity(results.len());
        let mut failed = 0;
        for (order, result) in orders.iter().zip(results) {
            match result {
                Ok(created_order) => created.push(created_order),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(product_id = %order.product_id, error = %e, "Order line failed");
                }
            }
        }

        if failed == 0 {
            cart.clear();
            self.step = CheckoutStep::Completed;
            self.last_error = None;
            info!(orders = created.len(), "Checkout completed");

            return Ok(CheckoutOutcome::Completed(CheckoutReceipt {
                attempt_id,
                orders: created,
                placed_at: Utc::now(),
                totals,
            }));
        }

        let rolled_back = if self.rollback {
            compensate(api, &token, &created).await
        } else {
            0
        };

        tracing::error!(
            failed,
            created = created.len(),
            rolled_back,
            "Checkout failed"
        );
        self.last_error = Some(FAILURE_MESSAGE);

        Ok(CheckoutOutcome::Failed(CheckoutFailure {
            attempt_id,
            failed,
            created: created.len(),
            rolled_back,
        }))
    }
}

/// One order request per cart line.
fn order_lines(cart: &Cart, customer_name: &str) -> Result<Vec<NewOrder>, PricingError> {
    cart.iter()
        .map(|line| {
            Ok(NewOrder {
                product_id: line.id,
                quantity: line.quantity,
                customer_name: customer_name.trim().to_string(),
                status: OrderStatus::New,
                total_amount: line.line_total().ok_or(PricingError::Overflow)?,
            })
        })
        .collect()
}

/// Delete orders created by a failed attempt. Returns how many were deleted.
async fn compensate<A: OrderApi>(api: &A, token: &AuthToken, created: &[CreatedOrder]) -> usize {
    let ids: Vec<OrderId> = created.iter().filter_map(|order| order.id).collect();
    if ids.len() < created.len() {
        tracing::warn!(
            unreferenced = created.len() - ids.len(),
            "Created orders without an id cannot be rolled back"
        );
    }

    let results = join_all(ids.iter().map(|&id| api.delete_order(token, id))).await;

    ids.iter()
        .zip(results)
        .filter(|(id, result)| match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(order_id = %id, error = %e, "Failed to roll back order");
                false
            }
        })
        .count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::num::NonZeroU32;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::sync::Barrier;

    use blockflow_core::{CurrencyCode, Price, ProductId};
    use rust_decimal::Decimal;

    use crate::models::Product;
    use crate::models::session::keys;
    use crate::storage::{KeyValueStore, MemoryStore};

    /// Records every request; fails creation for the configured products.
    #[derive(Default)]
    struct FakeOrderApi {
        failing: HashSet<ProductId>,
        created: Mutex<Vec<NewOrder>>,
        deleted: Mutex<Vec<OrderId>>,
    }

    impl FakeOrderApi {
        fn failing(ids: &[i64]) -> Self {
            Self {
                failing: ids.iter().copied().map(ProductId::new).collect(),
                ..Self::default()
            }
        }

        fn create_calls(&self) -> Vec<NewOrder> {
            self.created.lock().unwrap().clone()
        }

        fn delete_calls(&self) -> Vec<OrderId> {
            self.deleted.lock().unwrap().clone()
        }
    }

    impl OrderApi for FakeOrderApi {
        async fn create_order(
            &self,
            _token: &AuthToken,
            order: &NewOrder,
        ) -> Result<CreatedOrder, ApiError> {
            self.created.lock().unwrap().push(order.clone());
            if self.failing.contains(&order.product_id) {
                return Err(ApiError::Api {
                    status: 500,
                    message: "out of stock".to_string(),
                });
            }
            Ok(CreatedOrder::from_body(serde_json::json!({
                "id": order.product_id.as_i64() * 100,
                "status": "NEW"
            })))
        }

        async fn delete_order(&self, _token: &AuthToken, id: OrderId) -> Result<(), ApiError> {
            self.deleted.lock().unwrap().push(id);
            Ok(())
        }
    }

    /// Answers `create_order` only once `n` requests are waiting at the same
    /// time, so requests issued one after another never complete.
    struct InFlightOrderApi {
        barrier: Barrier,
    }

    impl InFlightOrderApi {
        fn new(n: usize) -> Self {
            Self {
                barrier: Barrier::new(n),
            }
        }
    }

    impl OrderApi for InFlightOrderApi {
        async fn create_order(
            &self,
            _token: &AuthToken,
            order: &NewOrder,
        ) -> Result<CreatedOrder, ApiError> {
            self.barrier.wait().await;
            Ok(CreatedOrder::from_body(serde_json::json!({
                "id": order.product_id.as_i64(),
                "status": "NEW"
            })))
        }

        async fn delete_order(&self, _token: &AuthToken, _id: OrderId) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn product(id: i64, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Block {id}"),
            category: None,
            image: None,
            price: Price::new(Decimal::from(price), CurrencyCode::USD),
            description: None,
            stock_quantity: None,
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            full_name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "5550100".to_string(),
            address: "1 Main St".to_string(),
            city: "Pune".to_string(),
            postal_code: "411001".to_string(),
            payment_method: PaymentMethod::Upi,
        }
    }

    struct Fixture {
        storage: Arc<MemoryStore>,
        cart: CartStore,
        credentials: CredentialStore,
        flow: CheckoutFlow,
    }

    fn fixture(lines: &[(i64, i64, u32)], token: Option<&str>, rollback: bool) -> Fixture {
        let storage = Arc::new(MemoryStore::new());
        if let Some(token) = token {
            storage.set(keys::AUTH_TOKEN, token).unwrap();
        }

        let mut cart = CartStore::load(storage.clone());
        for &(id, price, quantity) in lines {
            cart.add_item(&product(id, price), NonZeroU32::new(quantity).unwrap());
        }

        let mut flow = CheckoutFlow::new(rollback);
        flow.proceed(&cart.snapshot()).unwrap();

        Fixture {
            credentials: CredentialStore::new(storage.clone()),
            storage,
            cart,
            flow,
        }
    }

    #[test]
    fn test_validate_reports_blank_fields() {
        let mut form = form();
        form.phone = "   ".to_string();
        form.postal_code.clear();

        let err = form.validate().unwrap_err();
        assert_eq!(err.missing, vec!["phone", "postalCode"]);
        assert_eq!(err.to_string(), VALIDATION_MESSAGE);
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("UPI".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Card);
        assert!("cash".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_proceed_requires_items() {
        let mut flow = CheckoutFlow::new(true);
        assert_eq!(flow.proceed(&Cart::new()), Err(CheckoutError::EmptyCart));
        assert_eq!(flow.step(), CheckoutStep::Cart);
    }

    #[test]
    fn test_back_has_no_side_effects() {
        let mut fx = fixture(&[(1, 100, 2)], Some("tok"), true);
        let before = fx.cart.snapshot();

        fx.flow.back();

        assert_eq!(fx.flow.step(), CheckoutStep::Cart);
        assert!(Arc::ptr_eq(&before, &fx.cart.snapshot()));
    }

    #[tokio::test]
    async fn test_submit_outside_checkout_is_rejected() {
        let mut fx = fixture(&[(1, 100, 1)], Some("tok"), true);
        fx.flow.back();
        let api = FakeOrderApi::default();

        let result = fx
            .flow
            .submit(&form(), &mut fx.cart, &fx.credentials, &api)
            .await;

        assert_eq!(result.unwrap_err(), CheckoutError::NotInCheckout);
        assert!(api.create_calls().is_empty());
    }

    #[tokio::test]
    async fn test_success_clears_cart_and_completes() {
        let mut fx = fixture(&[(1, 100, 2), (2, 50, 1)], Some("tok"), true);
        let api = FakeOrderApi::default();

        let outcome = fx
            .flow
            .submit(&form(), &mut fx.cart, &fx.credentials, &api)
            .await
            .unwrap();

        let CheckoutOutcome::Completed(receipt) = &outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(receipt.orders.len(), 2);
        assert_eq!(receipt.totals.grand_total, Decimal::from(325));
        assert_eq!(outcome.message(), SUCCESS_MESSAGE);
        assert_eq!(outcome.navigation(), Some(Navigation::Home));

        assert_eq!(fx.flow.step(), CheckoutStep::Completed);
        assert!(fx.cart.snapshot().is_empty());
        assert_eq!(fx.storage.get(keys::CART).unwrap().as_deref(), Some("[]"));

        let mut calls = api.create_calls();
        calls.sort_by_key(|order| order.product_id);
        assert_eq!(
            calls,
            vec![
                NewOrder {
                    product_id: ProductId::new(1),
                    quantity: 2,
                    customer_name: "Asha Rao".to_string(),
                    status: OrderStatus::New,
                    total_amount: Decimal::from(200),
                },
                NewOrder {
                    product_id: ProductId::new(2),
                    quantity: 1,
                    customer_name: "Asha Rao".to_string(),
                    status: OrderStatus::New,
                    total_amount: Decimal::from(50),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_cart_and_rolls_back() {
        let mut fx = fixture(&[(1, 10, 1), (2, 20, 1), (3, 30, 1)], Some("tok"), true);
        let api = FakeOrderApi::failing(&[2]);

        let outcome = fx
            .flow
            .submit(&form(), &mut fx.cart, &fx.credentials, &api)
            .await
            .unwrap();

        assert_eq!(outcome.message(), FAILURE_MESSAGE);
        assert_eq!(outcome.navigation(), None);
        let CheckoutOutcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.failed, 1);
        assert_eq!(failure.created, 2);
        assert_eq!(failure.rolled_back, 2);

        assert_eq!(fx.flow.step(), CheckoutStep::Checkout);
        assert_eq!(fx.flow.last_error(), Some(FAILURE_MESSAGE));
        assert_eq!(fx.cart.snapshot().len(), 3);
        assert_eq!(api.create_calls().len(), 3);

        let mut deleted = api.delete_calls();
        deleted.sort();
        assert_eq!(deleted, vec![OrderId::new(100), OrderId::new(300)]);
    }

    #[tokio::test]
    async fn test_partial_failure_without_rollback_leaves_orders() {
        let mut fx = fixture(&[(1, 10, 1), (2, 20, 1)], Some("tok"), false);
        let api = FakeOrderApi::failing(&[1]);

        let outcome = fx
            .flow
            .submit(&form(), &mut fx.cart, &fx.credentials, &api)
            .await
            .unwrap();

        let CheckoutOutcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.created, 1);
        assert_eq!(failure.rolled_back, 0);
        assert!(api.delete_calls().is_empty());
        assert_eq!(fx.cart.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_token_requires_login() {
        let mut fx = fixture(&[(1, 100, 1)], None, true);
        let api = FakeOrderApi::default();

        let outcome = fx
            .flow
            .submit(&form(), &mut fx.cart, &fx.credentials, &api)
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::LoginRequired);
        assert_eq!(outcome.navigation(), Some(Navigation::Login));
        assert!(api.create_calls().is_empty());
        assert_eq!(fx.flow.step(), CheckoutStep::Checkout);
        assert_eq!(fx.cart.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_calls() {
        let mut fx = fixture(&[(1, 100, 1)], Some("tok"), true);
        let api = FakeOrderApi::default();
        let mut form = form();
        form.email.clear();

        let outcome = fx
            .flow
            .submit(&form, &mut fx.cart, &fx.credentials, &api)
            .await
            .unwrap();

        assert!(matches!(outcome, CheckoutOutcome::Invalid(ref e) if e.missing == ["email"]));
        assert_eq!(fx.flow.last_error(), Some(VALIDATION_MESSAGE));
        assert!(api.create_calls().is_empty());
    }

    #[tokio::test]
    async fn test_retry_after_failure_can_complete() {
        let mut fx = fixture(&[(1, 10, 1)], Some("tok"), true);

        let failing = FakeOrderApi::failing(&[1]);
        let first = fx
            .flow
            .submit(&form(), &mut fx.cart, &fx.credentials, &failing)
            .await
            .unwrap();
        assert!(!first.is_completed());

        let healthy = FakeOrderApi::default();
        let second = fx
            .flow
            .submit(&form(), &mut fx.cart, &fx.credentials, &healthy)
            .await
            .unwrap();
        assert!(second.is_completed());
        assert_eq!(fx.flow.last_error(), None);
    }

    #[tokio::test]
    async fn test_order_requests_are_issued_together() {
        let mut fx = fixture(&[(1, 10, 1), (2, 20, 1), (3, 30, 1)], Some("tok"), true);
        let api = InFlightOrderApi::new(3);

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            fx.flow.submit(&form(), &mut fx.cart, &fx.credentials, &api),
        )
        .await
        .expect("order requests did not overlap")
        .unwrap();

        let CheckoutOutcome::Completed(receipt) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(receipt.orders.len(), 3);
        assert!(fx.cart.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_unpriceable_cart_makes_no_calls() {
        let mut fx = fixture(&[(1, 10, 1)], Some("tok"), true);
        let huge = Product {
            price: Price::new(Decimal::MAX, CurrencyCode::USD),
            ..product(2, 0)
        };
        fx.cart.add_item(&huge, NonZeroU32::new(2).unwrap());
        let api = FakeOrderApi::default();

        let result = fx
            .flow
            .submit(&form(), &mut fx.cart, &fx.credentials, &api)
            .await;

        assert_eq!(
            result.unwrap_err(),
            CheckoutError::Pricing(PricingError::Overflow)
        );
        assert!(api.create_calls().is_empty());
        assert_eq!(fx.cart.snapshot().len(), 2);
    }
}
