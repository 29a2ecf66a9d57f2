//! Order commands.
//!
//! # Usage
//!
//! ```bash
//! bf orders list
//! bf orders update 1001 --status CONFIRMED
//! bf orders update 1001 -q 2 --customer-name "Asha Rao"
//! ```

use std::io::Write;

use blockflow_core::OrderId;
use blockflow_storefront::api::OrderChanges;
use blockflow_storefront::session::Session;

use crate::{CliError, render};

/// Print every order the logged-in user can see.
pub async fn list(session: &Session, out: &mut impl Write) -> Result<(), CliError> {
    let orders = session.list_orders().await?;
    render::orders(out, &orders)?;
    Ok(())
}

/// Edit one order and print it as the API returned it.
pub async fn update(
    session: &Session,
    id: OrderId,
    changes: OrderChanges,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let order = session.update_order(id, changes).await?;
    render::orders(out, std::slice::from_ref(&order))?;
    writeln!(out, "Order {id} updated.")?;
    Ok(())
}
