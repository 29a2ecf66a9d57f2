//! Catalog-boundary normalization.
//!
//! Every upstream product shape goes through [`CatalogProduct::normalize`]
//! before it can enter the cart. The browser client coalesced
//! `price || pricePerUnit || 0` at every use site; here it happens once.

use std::str::FromStr;

use blockflow_core::{CurrencyCode, Price};
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use crate::api::types::{CatalogProduct, ProductPage, RawProductPage};
use crate::models::Product;

/// Largest unit price accepted from the catalog or a persisted cart.
///
/// Keeps `price × u32::MAX` far inside the `Decimal` range.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Errors that can occur when normalizing a catalog product.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The product has no id and cannot be keyed in the cart.
    #[error("product has no id")]
    MissingId,

    /// A price field could not be read as a non-negative decimal no larger
    /// than [`MAX_UNIT_PRICE`].
    #[error("invalid price: {0}")]
    InvalidPrice(String),
}

impl CatalogProduct {
    /// Normalize into the canonical [`Product`] shape.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::MissingId`] if there is no id, or
    /// [`ProductError::InvalidPrice`] if the chosen price field is not a
    /// non-negative number.
    pub fn normalize(self) -> Result<Product, ProductError> {
        let id = self.id.ok_or(ProductError::MissingId)?;
        let amount = resolve_unit_price(self.price.as_ref(), self.price_per_unit.as_ref())?;

        Ok(Product {
            id,
            name: self.name.unwrap_or_default(),
            category: self.category.filter(|c| !c.is_empty()),
            image: self.image.filter(|i| !i.is_empty()),
            price: Price::new(amount, CurrencyCode::default()),
            description: self.description,
            stock_quantity: self.stock_quantity,
        })
    }
}

/// Resolve a unit price from the two upstream field names.
///
/// The first candidate that is present and not "empty" wins; `null`, `false`,
/// numeric zero and blank strings count as empty and fall through to the next
/// field. If neither field yields a value the price is zero.
///
/// # Errors
///
/// Returns [`ProductError::InvalidPrice`] if the winning candidate cannot be
/// parsed, is negative, or is above [`MAX_UNIT_PRICE`].
pub(crate) fn resolve_unit_price(
    price: Option<&Value>,
    price_per_unit: Option<&Value>,
) -> Result<Decimal, ProductError> {
    for candidate in [price, price_per_unit].into_iter().flatten() {
        if let Some(amount) = price_candidate(candidate)? {
            return Ok(amount);
        }
    }
    Ok(Decimal::ZERO)
}

fn price_candidate(value: &Value) -> Result<Option<Decimal>, ProductError> {
    let amount = match value {
        Value::Null | Value::Bool(false) => return Ok(None),
        Value::Number(n) => {
            let amount = parse_decimal(&n.to_string())?;
            if amount.is_zero() {
                return Ok(None);
            }
            amount
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            parse_decimal(s)?
        }
        other => return Err(ProductError::InvalidPrice(other.to_string())),
    };

    let price = Price::try_new(amount, CurrencyCode::default())
        .map_err(|e| ProductError::InvalidPrice(e.to_string()))?;
    if price.amount > MAX_UNIT_PRICE {
        return Err(ProductError::InvalidPrice(format!(
            "{amount} exceeds the maximum unit price of {MAX_UNIT_PRICE}"
        )));
    }
    Ok(Some(price.amount))
}

fn parse_decimal(s: &str) -> Result<Decimal, ProductError> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| ProductError::InvalidPrice(s.to_string()))
}

/// Convert a raw search page, skipping entries that cannot be normalized.
pub(crate) fn convert_product_page(raw: RawProductPage, page: u32) -> ProductPage {
    let products = raw
        .content
        .into_iter()
        .filter_map(|value| {
            let product = serde_json::from_value::<CatalogProduct>(value)
                .map_err(|e| ProductError::InvalidPrice(e.to_string()))
                .and_then(CatalogProduct::normalize);

            match product {
                Ok(product) => Some(product),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping catalog entry that failed normalization");
                    None
                }
            }
        })
        .collect();

    ProductPage {
        products,
        page,
        total_pages: raw.total_pages,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use blockflow_core::ProductId;
    use serde_json::json;

    fn catalog(value: Value) -> CatalogProduct {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_price_field_wins_when_present() {
        let product = catalog(json!({"id": 1, "name": "Block", "price": 42, "pricePerUnit": 99}))
            .normalize()
            .unwrap();
        assert_eq!(product.price.amount, Decimal::from(42));
    }

    #[test]
    fn test_falls_back_to_price_per_unit() {
        for value in [
            json!({"id": 1, "pricePerUnit": "12.75"}),
            json!({"id": 1, "price": null, "pricePerUnit": 12.75}),
            json!({"id": 1, "price": 0, "pricePerUnit": 12.75}),
            json!({"id": 1, "price": "", "pricePerUnit": "12.75"}),
        ] {
            let product = catalog(value).normalize().unwrap();
            assert_eq!(product.price.amount, Decimal::new(1275, 2));
        }
    }

    #[test]
    fn test_defaults_to_zero_when_absent() {
        let product = catalog(json!({"id": 5, "name": "Free sample"}))
            .normalize()
            .unwrap();
        assert_eq!(product.price.amount, Decimal::ZERO);
        assert_eq!(product.id, ProductId::new(5));
    }

    #[test]
    fn test_string_zero_does_not_fall_through() {
        let amount = resolve_unit_price(Some(&json!("0")), Some(&json!(10))).unwrap();
        assert_eq!(amount, Decimal::ZERO);
    }

    #[test]
    fn test_invalid_prices_rejected() {
        assert!(matches!(
            resolve_unit_price(Some(&json!("abc")), None),
            Err(ProductError::InvalidPrice(_))
        ));
        assert!(matches!(
            resolve_unit_price(Some(&json!(-3)), None),
            Err(ProductError::InvalidPrice(_))
        ));
        assert!(matches!(
            resolve_unit_price(Some(&json!({"amount": 3})), None),
            Err(ProductError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_prices_above_maximum_rejected() {
        assert_eq!(
            resolve_unit_price(Some(&json!(1_000_000_000)), None).unwrap(),
            MAX_UNIT_PRICE
        );
        assert!(matches!(
            resolve_unit_price(Some(&json!("70000000000000000000000000000")), None),
            Err(ProductError::InvalidPrice(_))
        ));
        assert!(matches!(
            catalog(json!({"id": 1, "price": 1e12})).normalize(),
            Err(ProductError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_missing_id_rejected() {
        assert_eq!(
            catalog(json!({"name": "Ghost", "price": 1})).normalize(),
            Err(ProductError::MissingId)
        );
    }

    #[test]
    fn test_blank_metadata_becomes_none() {
        let product = catalog(json!({"id": 1, "category": "", "image": ""}))
            .normalize()
            .unwrap();
        assert_eq!(product.category, None);
        assert_eq!(product.image, None);
    }

    #[test]
    fn test_convert_product_page_skips_bad_entries() {
        let raw = RawProductPage {
            content: vec![
                json!({"id": 1, "name": "Good", "price": 10}),
                json!({"name": "No id", "price": 10}),
                json!({"id": 2, "name": "Bad price", "price": "ten"}),
                json!({"id": "not-a-number"}),
            ],
            total_pages: 4,
        };

        let page = convert_product_page(raw, 1);
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 4);
    }
}
