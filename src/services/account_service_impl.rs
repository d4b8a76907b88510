//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::repositories::user::{hash_password_blocking, verify_password_blocking};
use crate::db::{NewUser, Store, UserChanges};
use crate::domain::UserId;
use crate::models::account::{Account, AccountPatch, normalize_email};
use crate::services::account_service::{AccountError, AccountService};

const MAX_FIELD_LEN: usize = 255;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("Invalid regex"))
}

/// Normalizes and checks an email address, returning the form to store.
pub fn validate_email(email: &str) -> Result<String, AccountError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AccountError::Validation(
            "Users must have an email address".to_string(),
        ));
    }
    if email.chars().count() > MAX_FIELD_LEN || !email_regex().is_match(&email) {
        return Err(AccountError::Validation(
            "Enter a valid email address.".to_string(),
        ));
    }
    Ok(email)
}

pub struct SeaOrmAccountService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn validate_password(&self, password: &str) -> Result<(), AccountError> {
        let min = self.security.min_password_length;
        if password.chars().count() < min {
            return Err(AccountError::Validation(format!(
                "Ensure this field has at least {min} characters."
            )));
        }
        Ok(())
    }

    fn validate_name(name: &str) -> Result<(), AccountError> {
        if name.chars().count() > MAX_FIELD_LEN {
            return Err(AccountError::Validation(format!(
                "Ensure this field has no more than {MAX_FIELD_LEN} characters."
            )));
        }
        Ok(())
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<UserId>) -> Result<(), AccountError> {
        if let Some(existing) = self.store.get_user_by_email(email).await?
            && Some(existing.id) != owner
        {
            return Err(AccountError::Validation(
                "user with this email already exists.".to_string(),
            ));
        }
        Ok(())
    }

    async fn insert(
        &self,
        email: &str,
        password: &str,
        name: &str,
        privileged: bool,
    ) -> Result<Account, AccountError> {
        let email = validate_email(email)?;
        self.validate_password(password)?;
        Self::validate_name(name)?;
        self.ensure_email_free(&email, None).await?;

        let password_hash = hash_password_blocking(password, &self.security).await?;

        let account = self
            .store
            .create_user(NewUser {
                email,
                password_hash,
                name: name.to_string(),
                is_staff: privileged,
                is_superuser: privileged,
            })
            .await?;

        info!(user_id = %account.id, superuser = privileged, "Account created");
        Ok(account)
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Account, AccountError> {
        self.insert(email, password, name.unwrap_or_default(), false)
            .await
    }

    async fn create_superuser(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Account, AccountError> {
        self.insert(email, password, "", true).await
    }

    async fn verify_password(
        &self,
        account: &Account,
        candidate: &str,
    ) -> Result<bool, AccountError> {
        let Some(hash) = self.store.get_user_password_hash(account.id).await? else {
            return Err(AccountError::NotFound);
        };
        Ok(verify_password_blocking(hash, candidate).await?)
    }

    async fn update_user(
        &self,
        id: UserId,
        patch: AccountPatch,
    ) -> Result<Account, AccountError> {
        if self.store.get_user(id).await?.is_none() {
            return Err(AccountError::NotFound);
        }

        let mut changes = UserChanges::default();

        if let Some(email) = patch.email {
            let email = validate_email(&email)?;
            self.ensure_email_free(&email, Some(id)).await?;
            changes.email = Some(email);
        }
        if let Some(name) = patch.name {
            Self::validate_name(&name)?;
            changes.name = Some(name);
        }
        if let Some(password) = patch.password {
            self.validate_password(&password)?;
            changes.password_hash = Some(hash_password_blocking(&password, &self.security).await?);
        }

        let account = self.store.update_user(id, changes).await?;
        info!(user_id = %id, "Account updated");
        Ok(account)
    }

    async fn get_user(&self, id: UserId) -> Result<Account, AccountError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(AccountError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_normalizes() {
        assert_eq!(validate_email("test@DOMAIN.com").unwrap(), "test@domain.com");
    }

    #[test]
    fn test_validate_email_rejects_empty_and_malformed() {
        assert!(matches!(validate_email(""), Err(AccountError::Validation(_))));
        assert!(matches!(validate_email("   "), Err(AccountError::Validation(_))));
        assert!(matches!(validate_email("plain"), Err(AccountError::Validation(_))));
        assert!(matches!(validate_email("a@b"), Err(AccountError::Validation(_))));
        assert!(matches!(validate_email("a b@c.com"), Err(AccountError::Validation(_))));
    }
}
