//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (wrong password or unknown user).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The auth endpoint answered without a usable token.
    #[error("auth response did not contain a token")]
    EmptyToken,

    /// The operation needs a stored token and there is none.
    #[error("not logged in")]
    NotLoggedIn,

    /// Credential slot could not be read or written.
    #[error("credential storage error: {0}")]
    Storage(#[from] StorageError),

    /// Auth endpoint request failed.
    #[error("auth request failed: {0}")]
    Api(ApiError),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => Self::InvalidCredentials,
            other => Self::Api(other),
        }
    }
}
