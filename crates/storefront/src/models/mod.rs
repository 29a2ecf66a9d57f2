//! Domain models for the storefront.
//!
//! - [`product`] - Canonical product shape, produced only by the catalog adapter
//! - [`cart`] - Cart line items and the cart itself
//! - [`session`] - Fixed keys of the durable slots

pub mod cart;
pub mod product;
pub mod session;

pub use cart::{Cart, CartLineItem};
pub use product::Product;
