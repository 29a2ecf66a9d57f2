//! Unified error handling with Sentry integration.
//!
//! Front-ends (the `bf` CLI, tests driving a [`crate::session::Session`])
//! work with a single `AppError`. [`AppError::report`] captures
//! unexpected failures to Sentry; [`AppError::user_message`] is the only text
//! a user should see and never exposes transport detail.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::pricing::PricingError;
use crate::services::auth::AuthError;
use crate::services::checkout::{CheckoutError, LOGIN_REQUIRED_MESSAGE};
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Durable slot could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// BlockFlow API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout operation not valid in the current state.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Cart totals could not be computed.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this is an unexpected failure worth an error report.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Storage(_) | Self::Auth(AuthError::Storage(_)) => true,
            Self::Api(err) | Self::Auth(AuthError::Api(err)) => api_error_is_internal(err),
            Self::Config(_)
            | Self::Auth(_)
            | Self::Checkout(_)
            | Self::Pricing(_)
            | Self::BadRequest(_) => false,
        }
    }

    /// Log the error, capturing internal failures to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::warn!(error = %self, "Operation rejected");
        }
    }

    /// Message safe to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Storage(_) => "Could not access local data".to_string(),
            Self::Api(err) => api_user_message(err),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::Storage(_) => "Could not access local data".to_string(),
                AuthError::Api(err) => api_user_message(err),
                AuthError::EmptyToken => "Authentication error".to_string(),
                AuthError::NotLoggedIn => "You must be logged in".to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => "Your cart is empty".to_string(),
                CheckoutError::NotInCheckout => "Checkout has not been started".to_string(),
                CheckoutError::Pricing(_) => CART_TOO_LARGE.to_string(),
            },
            Self::Pricing(_) => CART_TOO_LARGE.to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

const CART_TOO_LARGE: &str = "Cart total is too large; reduce quantities and try again";

const fn api_error_is_internal(err: &ApiError) -> bool {
    match err {
        ApiError::Http(_) | ApiError::Parse(_) | ApiError::InvalidUrl(_) => true,
        ApiError::Api { status, .. } => *status >= 500,
        ApiError::Unauthorized | ApiError::NotFound(_) | ApiError::RateLimited(_) => false,
    }
}

fn api_user_message(err: &ApiError) -> String {
    match err {
        ApiError::Unauthorized => LOGIN_REQUIRED_MESSAGE.to_string(),
        ApiError::NotFound(_) => "Not found".to_string(),
        ApiError::RateLimited(secs) => format!("Too many requests, try again in {secs} seconds"),
        ApiError::Api { status, .. } if *status < 500 => "Request rejected".to_string(),
        _ => "External service error".to_string(),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a username.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("quantity must be positive".to_string());
        assert_eq!(err.to_string(), "Bad request: quantity must be positive");

        let err = AppError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: cart is empty");
    }

    #[test]
    fn test_user_messages_hide_transport_detail() {
        let err = AppError::from(ApiError::Api {
            status: 502,
            message: "upstream connect error or disconnect/reset".to_string(),
        });
        assert_eq!(err.user_message(), "External service error");
        assert!(err.is_internal());

        let err = AppError::from(ApiError::Unauthorized);
        assert_eq!(err.user_message(), LOGIN_REQUIRED_MESSAGE);
        assert!(!err.is_internal());
    }

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(
            AppError::from(AuthError::InvalidCredentials).user_message(),
            "Invalid credentials"
        );
        assert!(AppError::from(AuthError::Storage(StorageError::Poisoned)).is_internal());
    }

    #[test]
    fn test_pricing_errors_are_user_facing() {
        let direct = AppError::from(PricingError::Overflow);
        let via_checkout = AppError::from(CheckoutError::from(PricingError::Overflow));

        assert_eq!(direct.user_message(), CART_TOO_LARGE);
        assert_eq!(via_checkout.user_message(), CART_TOO_LARGE);
        assert!(!direct.is_internal());
        assert!(!via_checkout.is_internal());
    }

    #[test]
    fn test_rate_limited_message() {
        let err = AppError::from(ApiError::RateLimited(7));
        assert_eq!(err.user_message(), "Too many requests, try again in 7 seconds");
    }
}
