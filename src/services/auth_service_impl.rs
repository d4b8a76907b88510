//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::db::repositories::token::is_well_formed_key;
use crate::db::repositories::user::{hash_password_blocking, verify_password_blocking};
use crate::models::account::{Account, normalize_email};
use crate::services::auth_service::{AuthError, AuthService};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
    /// Verified against when the email is unknown so both failure paths cost
    /// one Argon2 run.
    dummy_hash: OnceCell<String>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self {
            store,
            security,
            dummy_hash: OnceCell::const_new(),
        }
    }

    async fn dummy_hash(&self) -> Result<String, AuthError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| hash_password_blocking("recipebox-unknown-account", &self.security))
            .await?;
        Ok(hash.clone())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = normalize_email(email);

        let Some((account, hash)) = self.store.get_user_by_email_with_password(&email).await?
        else {
            let _ = verify_password_blocking(self.dummy_hash().await?, password).await?;
            warn!("Rejected login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        let valid = verify_password_blocking(hash, password).await?;
        if !valid || !account.is_active {
            warn!("Rejected login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(account)
    }

    async fn issue_token(&self, account: &Account) -> Result<String, AuthError> {
        let token = self.store.get_or_create_token(account.id).await?;
        info!(user_id = %account.id, "Token issued");
        Ok(token)
    }

    async fn resolve_token(&self, token: &str) -> Result<Account, AuthError> {
        if !is_well_formed_key(token) {
            return Err(AuthError::Unauthorized);
        }

        match self.store.find_account_by_token(token).await? {
            Some(account) if account.is_active => Ok(account),
            _ => Err(AuthError::Unauthorized),
        }
    }
}
