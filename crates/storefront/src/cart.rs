//! Persisted cart store.
//!
//! [`CartStore`] owns the current cart and writes it through to the
//! `blockflow-cart` slot after every mutation. Readers get cheap
//! `Arc<Cart>` snapshots; mutation is copy-on-write, so a snapshot handed out
//! earlier never changes underneath its holder.

use std::num::NonZeroU32;
use std::sync::Arc;

use blockflow_core::ProductId;
use tracing::{debug, instrument};

use crate::models::session::keys;
use crate::models::{Cart, Product};
use crate::pricing::{CartTotals, PricingError, compute_totals};
use crate::storage::{KeyValueStore, StorageError};

/// The cart plus its durable slot.
pub struct CartStore {
    storage: Arc<dyn KeyValueStore>,
    cart: Arc<Cart>,
}

impl CartStore {
    /// Rehydrate the cart from storage.
    ///
    /// An absent slot yields an empty cart. An unreadable or malformed slot
    /// is logged and also yields an empty cart; it is never fatal.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let cart = match storage.get(keys::CART) {
            Ok(Some(blob)) => Cart::from_json(&blob).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding malformed persisted cart");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted cart");
                Cart::new()
            }
        };

        debug!(lines = cart.len(), "Cart loaded");

        Self {
            storage,
            cart: Arc::new(cart),
        }
    }

    /// Current cart.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Cart> {
        Arc::clone(&self.cart)
    }

    /// Totals for the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the totals do not fit a `Decimal`.
    pub fn totals(&self) -> Result<CartTotals, PricingError> {
        compute_totals(&self.cart)
    }

    /// Add `quantity` units of `product`. Adding a product already in the
    /// cart increases its quantity and keeps the original line snapshot.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_item(&mut self, product: &Product, quantity: NonZeroU32) -> Arc<Cart> {
        Arc::make_mut(&mut self.cart).add(product, quantity);
        debug!(quantity = quantity.get(), "Added to cart");
        self.persist();
        self.snapshot()
    }

    /// Remove the line for `id`. Absent ids are a no-op.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn remove_item(&mut self, id: ProductId) -> Arc<Cart> {
        if self.cart.get(id).is_some() && Arc::make_mut(&mut self.cart).remove(id) {
            debug!("Removed from cart");
            self.persist();
        }
        self.snapshot()
    }

    /// Set the quantity of the line for `id`. A quantity of zero or less
    /// removes the line; absent ids are a no-op.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) -> Arc<Cart> {
        if self.cart.get(id).is_some() && Arc::make_mut(&mut self.cart).set_quantity(id, quantity)
        {
            debug!("Cart quantity updated");
            self.persist();
        }
        self.snapshot()
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Arc<Cart> {
        if !self.cart.is_empty() {
            Arc::make_mut(&mut self.cart).clear();
        }
        self.persist();
        self.snapshot()
    }

    /// Write the current cart to its slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be encoded or written.
    pub fn save(&self) -> Result<(), StorageError> {
        let blob = self.cart.to_json()?;
        self.storage.set(keys::CART, &blob)
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::error!(error = %e, "Failed to persist cart");
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}
