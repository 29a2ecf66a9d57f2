//! Table rendering for terminal output.

use std::io;

use blockflow_core::{CurrencyCode, Price};
use blockflow_storefront::api::{Order, ProductPage};
use blockflow_storefront::models::Cart;
use blockflow_storefront::pricing::CartTotals;
use blockflow_storefront::services::checkout::CheckoutReceipt;
use rust_decimal::Decimal;
use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

fn money(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::default()).to_string()
}

fn finish(builder: Builder, right_aligned: std::ops::Range<usize>) -> Table {
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(right_aligned), Alignment::right());
    table
}

/// Write a page of search results.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn products(out: &mut impl io::Write, page: &ProductPage) -> io::Result<()> {
    if page.products.is_empty() {
        return writeln!(out, "No products found.");
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Category", "Price", "Stock"]);

    for product in &page.products {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.clone().unwrap_or_default(),
            product.price.to_string(),
            product
                .stock_quantity
                .map(|stock| stock.to_string())
                .unwrap_or_default(),
        ]);
    }

    writeln!(out, "{}", finish(builder, 3..5))?;
    writeln!(
        out,
        "Page {} of {}",
        page.page.saturating_add(1),
        page.total_pages.max(1)
    )
}

/// Write the cart lines and totals.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn cart(out: &mut impl io::Write, cart: &Cart, totals: &CartTotals) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Your cart is empty.");
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Qty", "Unit", "Total"]);

    for line in cart {
        builder.push_record([
            line.id.to_string(),
            line.name.clone(),
            line.quantity.to_string(),
            money(line.price),
            line.line_total().map_or_else(|| "-".to_string(), money),
        ]);
    }

    writeln!(out, "{}", finish(builder, 2..5))?;
    summary(out, totals)
}

/// Write the totals block.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn summary(out: &mut impl io::Write, totals: &CartTotals) -> io::Result<()> {
    let mut builder = Builder::default();
    builder.push_record(["Items".to_string(), totals.item_count.to_string()]);
    builder.push_record(["Subtotal".to_string(), money(totals.subtotal)]);
    builder.push_record(["Tax (10%)".to_string(), money(totals.tax)]);
    builder.push_record(["Shipping".to_string(), money(totals.shipping)]);
    builder.push_record(["Total".to_string(), money(totals.grand_total)]);

    writeln!(out, "{}", finish(builder, 1..2))
}

/// Write the orders created by a completed checkout.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn receipt(out: &mut impl io::Write, receipt: &CheckoutReceipt) -> io::Result<()> {
    let mut builder = Builder::default();
    builder.push_record(["Order", "Status"]);

    for order in &receipt.orders {
        builder.push_record([
            order
                .id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
            order
                .body
                .get("status")
                .and_then(|status| status.as_str())
                .unwrap_or("-")
                .to_string(),
        ]);
    }

    writeln!(out, "{}", finish(builder, 0..1))?;
    summary(out, &receipt.totals)?;
    writeln!(
        out,
        "Reference {} at {}",
        receipt.attempt_id,
        receipt.placed_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Write a list of orders.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn orders(out: &mut impl io::Write, orders: &[Order]) -> io::Result<()> {
    if orders.is_empty() {
        return writeln!(out, "No orders found.");
    }

    let mut builder = Builder::default();
    builder.push_record(["Order", "Product", "Customer", "Qty", "Total", "Status", "Placed"]);

    for order in orders {
        builder.push_record([
            order.id.to_string(),
            order
                .product_id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
            order.customer_name.clone().unwrap_or_default(),
            order
                .quantity
                .map_or_else(|| "-".to_string(), |qty| qty.to_string()),
            order.total_amount.map_or_else(|| "-".to_string(), money),
            order
                .status
                .map_or_else(|| "-".to_string(), |status| status.to_string()),
            order.order_date.clone().unwrap_or_default(),
        ]);
    }

    writeln!(out, "{}", finish(builder, 3..5))
}
