use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::OnConflict};

use crate::domain::UserId;
use crate::entities::{auth_tokens, prelude::*, users};
use crate::models::account::Account;

/// Length in bytes of a freshly minted key (hex-encoded to 40 chars).
const TOKEN_BYTES: usize = 20;

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_for_user(&self, user_id: UserId) -> Result<Option<String>> {
        let token = AuthTokens::find()
            .filter(auth_tokens::Column::UserId.eq(user_id.value()))
            .one(&self.conn)
            .await
            .context("Failed to query token by user")?;

        Ok(token.map(|t| t.key))
    }

    /// Returns the user's standing token, minting one on first use.
    ///
    /// Concurrent first logins race on the unique `user_id` column; the loser's
    /// insert is dropped and both read back the same row.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<String> {
        if let Some(key) = self.get_for_user(user_id).await? {
            return Ok(key);
        }

        let candidate = auth_tokens::ActiveModel {
            key: Set(generate_token_key()),
            user_id: Set(user_id.value()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        AuthTokens::insert(candidate)
            .on_conflict(
                OnConflict::column(auth_tokens::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to insert token")?;

        self.get_for_user(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Token for user {user_id} vanished after insert"))
    }

    /// Reverse lookup from a presented key to its account.
    pub async fn find_account(&self, key: &str) -> Result<Option<Account>> {
        let row = AuthTokens::find_by_id(key.to_string())
            .find_also_related(users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query account by token")?;

        Ok(row.and_then(|(_, user)| user).map(Account::from))
    }
}

/// Generate a random token key (40 character lowercase hex string)
#[must_use]
pub fn generate_token_key() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);

    bytes.iter().fold(String::with_capacity(TOKEN_BYTES * 2), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Cheap shape check so malformed keys never reach the database.
#[must_use]
pub fn is_well_formed_key(key: &str) -> bool {
    key.len() == TOKEN_BYTES * 2 && key.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_are_well_formed() {
        let key = generate_token_key();
        assert_eq!(key.len(), 40);
        assert!(is_well_formed_key(&key));
        assert_ne!(key, generate_token_key());
    }

    #[test]
    fn test_malformed_keys_rejected() {
        assert!(!is_well_formed_key(""));
        assert!(!is_well_formed_key("abc"));
        assert!(!is_well_formed_key(&"z".repeat(40)));
    }
}
