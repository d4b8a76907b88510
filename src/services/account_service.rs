//! Domain service for account management.
//!
//! Handles signup, superuser creation, password checks, and profile updates.

use thiserror::Error;

use crate::domain::UserId;
use crate::models::account::{Account, AccountPatch};

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("User not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates a regular account. The email's domain is lowercased and the
    /// password is hashed before anything is stored.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] for an empty or malformed email, an
    /// email already in use, or a password shorter than the configured minimum.
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Account, AccountError>;

    /// Same as [`AccountService::create_user`] with the staff and superuser flags set.
    async fn create_superuser(&self, email: &str, password: &str)
    -> Result<Account, AccountError>;

    /// Compares `candidate` against the account's stored hash.
    async fn verify_password(
        &self,
        account: &Account,
        candidate: &str,
    ) -> Result<bool, AccountError>;

    /// Applies the supplied fields. A new password is re-hashed.
    async fn update_user(&self, id: UserId, patch: AccountPatch)
    -> Result<Account, AccountError>;

    async fn get_user(&self, id: UserId) -> Result<Account, AccountError>;
}
