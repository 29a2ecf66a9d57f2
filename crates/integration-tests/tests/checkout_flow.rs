//! End-to-end checkout against the fake BlockFlow API.
//!
//! Each test gets its own fake server and its own data directory, so the
//! durable slots go through the real `FileStore`.

use std::num::NonZeroU32;

use blockflow_core::ProductId;
use blockflow_integration_tests::{FakeApi, PASSWORD};
use blockflow_storefront::error::AppError;
use blockflow_storefront::services::auth::AuthError;
use blockflow_storefront::services::checkout::{
    CheckoutForm, CheckoutOutcome, CheckoutStep, FAILURE_MESSAGE, Navigation, PaymentMethod,
};
use blockflow_storefront::session::Session;
use blockflow_storefront::state::AppState;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::TempDir;

fn start_session(api: &FakeApi, dir: &TempDir) -> Session {
    let state = AppState::new(api.config(dir.path())).expect("app state");
    Session::start(state)
}

fn qty(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).expect("non-zero quantity")
}

fn form() -> CheckoutForm {
    CheckoutForm {
        full_name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "5550100".to_string(),
        address: "1 Main St".to_string(),
        city: "Pune".to_string(),
        postal_code: "411001".to_string(),
        payment_method: PaymentMethod::Card,
    }
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_login_add_and_checkout() {
    let api = FakeApi::spawn().await;
    let dir = TempDir::new().expect("tempdir");
    let mut session = start_session(&api, &dir);

    let username = session.login("asha", PASSWORD).await.expect("login");
    assert_eq!(username, "asha");

    session
        .add_to_cart(ProductId::new(1), qty(2))
        .await
        .expect("add granite");
    session
        .add_to_cart(ProductId::new(2), qty(1))
        .await
        .expect("add oak");

    let totals = session.totals().expect("totals");
    assert_eq!(totals.subtotal, Decimal::from(250));
    assert_eq!(totals.tax, Decimal::from(25));
    assert_eq!(totals.shipping, Decimal::from(50));
    assert_eq!(totals.grand_total, Decimal::from(325));

    session.proceed_to_checkout().expect("proceed");
    let outcome = session.submit_checkout(&form()).await.expect("submit");

    assert!(outcome.is_completed(), "unexpected outcome: {outcome:?}");
    assert_eq!(outcome.navigation(), Some(Navigation::Home));
    assert_eq!(session.checkout_step(), CheckoutStep::Completed);
    assert!(session.cart().is_empty());

    let mut bodies: Vec<_> = api.orders().into_iter().map(|order| order.body).collect();
    bodies.sort_by_key(|body| body["productId"].as_i64());
    assert_eq!(
        bodies,
        vec![
            json!({"productId": 1, "quantity": 2, "customerName": "Asha Rao", "status": "NEW", "totalAmount": 200.0}),
            json!({"productId": 2, "quantity": 1, "customerName": "Asha Rao", "status": "NEW", "totalAmount": 50.0}),
        ]
    );

    // The cleared cart is what the next run sees.
    let reopened = start_session(&api, &dir);
    assert!(reopened.cart().is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_partial_failure_keeps_cart_and_rolls_back() {
    let api = FakeApi::spawn().await;
    let dir = TempDir::new().expect("tempdir");
    let mut session = start_session(&api, &dir);

    session.login("asha", PASSWORD).await.expect("login");
    for id in 1..=3 {
        session
            .add_to_cart(ProductId::new(id), qty(1))
            .await
            .expect("add to cart");
    }
    api.fail_orders_for(2);

    session.proceed_to_checkout().expect("proceed");
    let outcome = session.submit_checkout(&form()).await.expect("submit");

    assert_eq!(outcome.message(), FAILURE_MESSAGE);
    let CheckoutOutcome::Failed(failure) = outcome else {
        panic!("expected a failed checkout");
    };
    assert_eq!(failure.failed, 1);
    assert_eq!(failure.created, 2);
    assert_eq!(failure.rolled_back, 2);

    assert_eq!(session.checkout_step(), CheckoutStep::Checkout);
    assert_eq!(session.checkout_error(), Some(FAILURE_MESSAGE));
    assert_eq!(session.cart().len(), 3);

    assert_eq!(api.order_requests(), 3);
    assert!(api.orders().is_empty(), "created orders should be rolled back");
    assert_eq!(api.deleted().len(), 2);

    let reopened = start_session(&api, &dir);
    assert_eq!(reopened.cart().len(), 3);
}

#[tokio::test]
async fn test_partial_failure_without_rollback_leaves_orders() {
    let api = FakeApi::spawn().await;
    let dir = TempDir::new().expect("tempdir");
    let mut config = api.config(dir.path());
    config.checkout_rollback = false;
    let mut session = Session::start(AppState::new(config).expect("app state"));

    session.login("asha", PASSWORD).await.expect("login");
    session
        .add_to_cart(ProductId::new(1), qty(1))
        .await
        .expect("add granite");
    session
        .add_to_cart(ProductId::new(3), qty(4))
        .await
        .expect("add brick");
    api.fail_orders_for(3);

    session.proceed_to_checkout().expect("proceed");
    let outcome = session.submit_checkout(&form()).await.expect("submit");

    assert!(matches!(
        outcome,
        CheckoutOutcome::Failed(failure) if failure.created == 1 && failure.rolled_back == 0
    ));
    assert_eq!(api.orders().len(), 1);
    assert!(api.deleted().is_empty());
    assert_eq!(session.cart().len(), 2);
}

#[tokio::test]
async fn test_missing_token_makes_no_requests() {
    let api = FakeApi::spawn().await;
    let dir = TempDir::new().expect("tempdir");
    let mut session = start_session(&api, &dir);

    session
        .add_to_cart(ProductId::new(1), qty(1))
        .await
        .expect("add granite");
    session.proceed_to_checkout().expect("proceed");

    let outcome = session.submit_checkout(&form()).await.expect("submit");

    assert_eq!(outcome, CheckoutOutcome::LoginRequired);
    assert_eq!(outcome.navigation(), Some(Navigation::Login));
    assert_eq!(api.order_requests(), 0);
    assert_eq!(session.cart().len(), 1);
}

#[tokio::test]
async fn test_incomplete_form_makes_no_requests() {
    let api = FakeApi::spawn().await;
    let dir = TempDir::new().expect("tempdir");
    let mut session = start_session(&api, &dir);

    session.login("asha", PASSWORD).await.expect("login");
    session
        .add_to_cart(ProductId::new(1), qty(1))
        .await
        .expect("add granite");
    session.proceed_to_checkout().expect("proceed");

    let mut form = form();
    form.city = "  ".to_string();
    let outcome = session.submit_checkout(&form).await.expect("submit");

    assert!(matches!(outcome, CheckoutOutcome::Invalid(_)));
    assert_eq!(api.order_requests(), 0);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let api = FakeApi::spawn().await;
    let dir = TempDir::new().expect("tempdir");
    let session = start_session(&api, &dir);

    let err = session
        .login("asha", "wrong")
        .await
        .expect_err("login should fail");

    assert!(matches!(err, AppError::Auth(AuthError::InvalidCredentials)));
    assert!(session.credentials().token().is_none());
}

#[tokio::test]
async fn test_logout_keeps_cart() {
    let api = FakeApi::spawn().await;
    let dir = TempDir::new().expect("tempdir");
    let mut session = start_session(&api, &dir);

    session.login("asha", PASSWORD).await.expect("login");
    session
        .add_to_cart(ProductId::new(3), qty(6))
        .await
        .expect("add brick");
    session.logout().expect("logout");

    let reopened = start_session(&api, &dir);
    assert!(reopened.credentials().token().is_none());
    assert_eq!(reopened.cart().total_quantity(), 6);
}
