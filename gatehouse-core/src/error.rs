use thiserror::Error;

use crate::identity::crypto::AuthCryptoError;

/// Infrastructure failures raised by the identity collaborators.
///
/// Business outcomes (duplicate email, weak password, unknown role) are never
/// reported through this type; they travel inside
/// [`IdentityResult`](crate::identity::IdentityResult).
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] AuthCryptoError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for IdentityError {
    fn from(err: sqlx::Error) -> Self {
        IdentityError::Storage(err.to_string())
    }
}

#[cfg(feature = "database")]
impl From<sqlx::migrate::MigrateError> for IdentityError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        IdentityError::Storage(format!("migration failed: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, IdentityError>;
