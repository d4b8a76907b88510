//! Domain service for credential checks and token issuance.

use thiserror::Error;

use crate::models::account::Account;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately uninformative: never says whether the email exists.
    #[error("Unable to authenticate with provided credentials")]
    InvalidCredentials,

    #[error("Invalid token.")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Looks up the account by email and checks the password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email, a wrong
    /// password, or an inactive account alike.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AuthError>;

    /// Returns the account's standing token, minting it on first use.
    async fn issue_token(&self, account: &Account) -> Result<String, AuthError>;

    /// Resolves a presented token to its account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] when the token is malformed, unknown,
    /// or belongs to an inactive account.
    async fn resolve_token(&self, token: &str) -> Result<Account, AuthError>;
}
