//! Canonical product shape.

use blockflow_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

/// A catalog product after normalization.
///
/// The upstream API names the unit price either `price` or `pricePerUnit`
/// and sends it as a number or a string. By the time a `Product` exists that
/// ambiguity is resolved into a single [`Price`], so nothing downstream (the
/// cart in particular) depends on upstream field naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Option<String>,
    pub image: Option<String>,
    pub price: Price,
    pub description: Option<String>,
    pub stock_quantity: Option<i64>,
}
