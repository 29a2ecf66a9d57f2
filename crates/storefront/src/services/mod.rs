//! Business logic services for storefront.
//!
//! - `auth` - Login against the remote auth endpoint and the credential slots
//! - `checkout` - Checkout state machine and per-line order submission

pub mod auth;
pub mod checkout;
