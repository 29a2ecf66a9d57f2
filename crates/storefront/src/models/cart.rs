//! Cart line items and the cart.
//!
//! A [`Cart`] is an insertion-ordered list of [`CartLineItem`]s keyed by
//! product id. Two invariants hold for every cart value that leaves this
//! module:
//!
//! - at most one line per product id
//! - every line has `quantity >= 1`
//!
//! The mutators are `pub(crate)`: outside the crate a cart can only be read,
//! so the only way to change one is through [`crate::cart::CartStore`].

use std::num::NonZeroU32;

use blockflow_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::conversions::resolve_unit_price;
use crate::models::Product;

/// One product in the cart.
///
/// Display metadata and the unit price are copied from the product when the
/// line is created. Later catalog edits do not touch existing lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub category: Option<String>,
    pub image: Option<String>,
    /// Unit price at add-time.
    pub price: Decimal,
    pub quantity: u32,
}

impl CartLineItem {
    /// Snapshot a product into a new line.
    #[must_use]
    pub fn from_product(product: &Product, quantity: NonZeroU32) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
            price: product.price.amount,
            quantity: quantity.get(),
        }
    }

    /// `price × quantity` for this line, or `None` if it overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Ordered cart contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Iterate over line items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartLineItem> {
        self.items.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Serialize to the persisted JSON array form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Parse the persisted JSON array form.
    ///
    /// Parsing is tolerant of blobs written by older clients: unit prices may
    /// be numbers or strings under `price` or `pricePerUnit`, extra product
    /// fields are ignored, unreadable lines and lines with a non-positive
    /// quantity are dropped, and duplicate ids are merged into the first
    /// occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error only if the blob is not a JSON array.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: Vec<Value> = serde_json::from_str(json)?;
        let mut cart = Self::new();

        for (index, value) in raw.into_iter().enumerate() {
            match stored_line(value) {
                Ok(Some(line)) => cart.absorb(line),
                Ok(None) => {
                    tracing::debug!(index, "Dropping persisted cart line with non-positive quantity");
                }
                Err(reason) => {
                    tracing::warn!(index, %reason, "Discarding unreadable persisted cart line");
                }
            }
        }

        Ok(cart)
    }

    // =========================================================================
    // Mutators (crate-private)
    // =========================================================================

    /// Add `quantity` units of `product`, merging into an existing line.
    pub(crate) fn add(&mut self, product: &Product, quantity: NonZeroU32) {
        self.absorb(CartLineItem::from_product(product, quantity));
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub(crate) fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Replace the quantity of the line for `id`; `quantity <= 0` removes it.
    /// Returns whether the cart changed.
    pub(crate) fn set_quantity(&mut self, id: ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(id);
        }

        let quantity = clamp_quantity(quantity);
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    fn absorb(&mut self, line: CartLineItem) {
        if line.quantity == 0 {
            return;
        }

        if let Some(existing) = self.items.iter_mut().find(|item| item.id == line.id) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            self.items.push(line);
        }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLineItem;
    type IntoIter = std::slice::Iter<'a, CartLineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Persisted line as written by any client version.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLine {
    id: ProductId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    price_per_unit: Option<Value>,
    quantity: i64,
}

/// Decode one persisted line. `Ok(None)` means the line is well-formed but
/// has a non-positive quantity and must not enter the cart.
fn stored_line(value: Value) -> Result<Option<CartLineItem>, String> {
    let stored: StoredLine = serde_json::from_value(value).map_err(|e| e.to_string())?;

    if stored.quantity <= 0 {
        return Ok(None);
    }

    let price = resolve_unit_price(stored.price.as_ref(), stored.price_per_unit.as_ref())
        .map_err(|e| e.to_string())?;

    Ok(Some(CartLineItem {
        id: stored.id,
        name: stored.name.unwrap_or_default(),
        category: stored.category,
        image: stored.image,
        price,
        quantity: clamp_quantity(stored.quantity),
    }))
}

/// Narrow a positive quantity to `u32`, clamping at `u32::MAX`.
fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity).unwrap_or_else(|_| {
        tracing::warn!(quantity, max = u32::MAX, "Clamping cart quantity");
        u32::MAX
    })
}
