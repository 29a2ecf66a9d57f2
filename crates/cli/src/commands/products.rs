//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! bf products search --q granite --category Stone --max-price 250
//! bf products categories
//! ```

use std::io::Write;

use blockflow_storefront::api::ProductQuery;
use blockflow_storefront::error::AppError;
use blockflow_storefront::state::AppState;

use crate::{CliError, render};

/// Run an advanced search and print one page of results.
pub async fn search(
    state: &AppState,
    query: &ProductQuery,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if query.min_price > query.max_price {
        return Err(AppError::BadRequest("--min-price must not exceed --max-price".to_string()).into());
    }

    let page = state
        .client()
        .search_products(query)
        .await
        .map_err(AppError::from)?;

    render::products(out, &page)?;
    Ok(())
}

/// Print the product categories, one per line.
pub async fn categories(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    let categories = state.client().categories().await;
    if categories.is_empty() {
        writeln!(out, "No categories available.")?;
    }
    for category in categories {
        writeln!(out, "{category}")?;
    }
    Ok(())
}
