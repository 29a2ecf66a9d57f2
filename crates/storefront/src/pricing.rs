//! Cart totals.
//!
//! Pure functions over a cart snapshot. Nothing is cached; totals are cheap
//! to recompute on every render.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::Cart;

/// Flat tax rate applied to the subtotal (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Flat shipping charge for any non-empty cart.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Errors that can occur when totalling a cart.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PricingError {
    /// A line or cart total does not fit in a `Decimal`.
    #[error("cart total is too large to compute")]
    Overflow,
}

/// Derived totals for a cart snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub grand_total: Decimal,
    /// Sum of quantities, not the number of lines.
    pub item_count: u64,
}

impl CartTotals {
    /// Totals of an empty cart.
    pub const ZERO: Self = Self {
        subtotal: Decimal::ZERO,
        tax: Decimal::ZERO,
        shipping: Decimal::ZERO,
        grand_total: Decimal::ZERO,
        item_count: 0,
    };
}

/// Compute totals for a cart.
///
/// `tax = subtotal × 10%`, shipping is flat 50 when the cart has any line,
/// and the grand total is the sum of the three. Amounts are exact; rounding
/// is left to display.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if any intermediate amount exceeds the
/// `Decimal` range.
pub fn compute_totals(cart: &Cart) -> Result<CartTotals, PricingError> {
    if cart.is_empty() {
        return Ok(CartTotals::ZERO);
    }

    let subtotal = cart
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| {
            item.line_total().and_then(|line| sum.checked_add(line))
        })
        .ok_or(PricingError::Overflow)?;
    let tax = subtotal
        .checked_mul(TAX_RATE)
        .ok_or(PricingError::Overflow)?;
    let shipping = FLAT_SHIPPING;
    let grand_total = subtotal
        .checked_add(tax)
        .and_then(|total| total.checked_add(shipping))
        .ok_or(PricingError::Overflow)?;

    Ok(CartTotals {
        subtotal,
        tax,
        shipping,
        grand_total,
        item_count: cart.total_quantity(),
    })
}
