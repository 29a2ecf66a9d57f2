//! Durable slot keys.
//!
//! These match the keys the browser client used for local storage, so a data
//! directory can be seeded from an exported browser profile.

/// Keys for the durable key-value slots.
pub mod keys {
    /// Key for the JSON-serialized cart line items.
    pub const CART: &str = "blockflow-cart";

    /// Key for the bearer token issued by the auth endpoint.
    pub const AUTH_TOKEN: &str = "authToken";

    /// Key for the username returned alongside the token.
    pub const USERNAME: &str = "username";
}
