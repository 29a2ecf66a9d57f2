//! Cart commands. Every edit prints the updated cart.
//!
//! # Usage
//!
//! ```bash
//! bf cart add 12 -q 3
//! bf cart set 12 1
//! bf cart remove 12
//! bf cart show
//! bf cart clear
//! ```

use std::io::Write;
use std::num::NonZeroU32;

use blockflow_core::ProductId;
use blockflow_storefront::session::Session;

use crate::{CliError, render};

/// Print the cart and its totals.
pub fn show(session: &Session, out: &mut impl Write) -> Result<(), CliError> {
    render::cart(out, &session.cart(), &session.totals()?)?;
    Ok(())
}

/// Fetch a product and add it to the cart.
pub async fn add(
    session: &mut Session,
    id: ProductId,
    quantity: NonZeroU32,
    out: &mut impl Write,
) -> Result<(), CliError> {
    session.add_to_cart(id, quantity).await?;
    show(session, out)
}

/// Remove a product from the cart.
pub fn remove(session: &mut Session, id: ProductId, out: &mut impl Write) -> Result<(), CliError> {
    session.cart_store().remove_item(id);
    show(session, out)
}

/// Replace a product's quantity.
pub fn set(
    session: &mut Session,
    id: ProductId,
    quantity: i64,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if session.cart().get(id).is_none() {
        writeln!(out, "Product {id} is not in the cart.")?;
    }
    session.cart_store().set_quantity(id, quantity);
    show(session, out)
}

/// Empty the cart.
pub fn clear(session: &mut Session, out: &mut impl Write) -> Result<(), CliError> {
    session.cart_store().clear();
    show(session, out)
}
