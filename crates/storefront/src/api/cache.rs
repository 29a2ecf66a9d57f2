//! Cache types for catalog responses.

use crate::models::Product;

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Categories(Vec<String>),
}

/// Cache key for a single product.
pub fn product_key(id: blockflow_core::ProductId) -> String {
    format!("product:{id}")
}

/// Cache key for the category list.
pub const CATEGORIES_KEY: &str = "categories";
