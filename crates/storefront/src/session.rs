//! Per-user session.
//!
//! A [`Session`] is constructed once per application run from an
//! [`AppState`] and owns the cart store, the credential slots and the
//! checkout flow. Front-ends drive everything through it; nothing here is
//! global.

use std::num::NonZeroU32;
use std::sync::Arc;

use blockflow_core::{OrderId, ProductId};
use tracing::instrument;

use crate::api::{ApiError, Order, OrderChanges};
use crate::cart::CartStore;
use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::Cart;
use crate::pricing::CartTotals;
use crate::services::auth::{AuthError, AuthService, AuthToken, CredentialStore};
use crate::services::checkout::{CheckoutFlow, CheckoutForm, CheckoutOutcome, CheckoutStep};
use crate::state::AppState;

/// One user's cart, credentials and checkout progress.
pub struct Session {
    state: AppState,
    cart: CartStore,
    credentials: CredentialStore,
    checkout: CheckoutFlow,
}

impl Session {
    /// Start a session, rehydrating the cart from the durable slot.
    #[must_use]
    pub fn start(state: AppState) -> Self {
        let storage = state.storage();
        let checkout = CheckoutFlow::new(state.config().checkout_rollback);

        Self {
            cart: CartStore::load(Arc::clone(&storage)),
            credentials: CredentialStore::new(storage),
            checkout,
            state,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn cart(&self) -> Arc<Cart> {
        self.cart.snapshot()
    }

    /// Totals for the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the totals do not fit a `Decimal`.
    pub fn totals(&self) -> Result<CartTotals> {
        Ok(self.cart.totals()?)
    }

    /// Direct access to the cart store.
    pub fn cart_store(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    #[must_use]
    pub const fn checkout_step(&self) -> CheckoutStep {
        self.checkout.step()
    }

    /// Message of the last unsuccessful checkout submit.
    #[must_use]
    pub const fn checkout_error(&self) -> Option<&'static str> {
        self.checkout.last_error()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in and remember the issued token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or cannot be stored.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let username = AuthService::new(self.state.client(), &self.credentials)
            .login(username, password)
            .await?;
        set_sentry_user(&username);
        Ok(username)
    }

    /// Forget the stored credentials and end the session.
    ///
    /// The persisted cart is left in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential slots cannot be cleared.
    pub fn logout(self) -> Result<()> {
        AuthService::new(self.state.client(), &self.credentials).logout()?;
        clear_sentry_user();
        Ok(())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch a product from the catalog and add it to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be fetched.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add_to_cart(&mut self, id: ProductId, quantity: NonZeroU32) -> Result<Arc<Cart>> {
        let product = self.state.client().get_product(id).await?;
        let product_id = id.to_string();
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));
        Ok(self.cart.add_item(&product, quantity))
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Move from the cart to the checkout form.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty.
    pub fn proceed_to_checkout(&mut self) -> Result<()> {
        self.checkout.proceed(&self.cart.snapshot())?;
        Ok(())
    }

    /// Leave the checkout form.
    pub fn back_to_cart(&mut self) {
        self.checkout.back();
    }

    /// Submit the checkout form against the live order API.
    ///
    /// # Errors
    ///
    /// Returns an error only if checkout has not been started or the cart is
    /// empty. Order failures are reported through the outcome.
    pub async fn submit_checkout(&mut self, form: &CheckoutForm) -> Result<CheckoutOutcome> {
        let outcome = self
            .checkout
            .submit(form, &mut self.cart, &self.credentials, self.state.client())
            .await?;

        add_breadcrumb("checkout", outcome.message(), None);
        Ok(outcome)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    fn require_token(&self) -> Result<AuthToken> {
        Ok(self.credentials.token().ok_or(AuthError::NotLoggedIn)?)
    }

    /// List the orders visible to the logged-in user, including any a
    /// checkout created.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored or the request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let token = self.require_token()?;
        Ok(self.state.client().list_orders(&token).await?)
    }

    /// Apply `changes` to an existing order.
    ///
    /// The update endpoint replaces every field, so the current order is
    /// read first and the unchanged fields are sent back as they were.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, nothing would change, the
    /// order does not exist or lacks a product, or a request fails.
    #[instrument(skip(self, changes), fields(order_id = %id))]
    pub async fn update_order(&self, id: OrderId, changes: OrderChanges) -> Result<Order> {
        if changes.is_empty() {
            return Err(AppError::BadRequest("Nothing to update".to_string()));
        }

        let token = self.require_token()?;
        let client = self.state.client();

        let current = client
            .list_orders(&token)
            .await?
            .into_iter()
            .find(|order| order.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("Order not found: {id}")))?;

        let update = current
            .with_changes(changes)
            .ok_or_else(|| AppError::BadRequest(format!("Order {id} cannot be edited")))?;

        let updated = client.update_order(&token, id, &update).await?;

        let order_id = id.to_string();
        add_breadcrumb("orders", "Updated order", Some(&[("order_id", order_id.as_str())]));
        Ok(updated)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("cart", &self.cart)
            .field("credentials", &self.credentials)
            .field("checkout", &self.checkout)
            .finish_non_exhaustive()
    }
}
