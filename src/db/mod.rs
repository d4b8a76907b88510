use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::{AttributeKind, RecipeId, UserId};
use crate::models::account::Account;
use crate::models::attribute::Attribute;
use crate::models::recipe::{Recipe, RecipeFields, RecipeFilter, RecipePatch};

pub mod migrator;
pub mod repositories;

pub use repositories::user::{NewUser, UserChanges};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = is_in_memory(db_url);

        // Every pooled connection to `:memory:` would see its own empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            ensure_sqlite_file(db_url).await?;
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        // Recycling the only connection to `:memory:` would drop the data.
        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        ping(&self.conn).await
    }

    /// Polls until the database answers a trivial query.
    ///
    /// Fails after `attempts` unsuccessful probes spaced `interval` apart.
    pub async fn wait_for_database(db_url: &str, attempts: u32, interval: Duration) -> Result<()> {
        info!("Waiting for database...");

        if !is_in_memory(db_url) {
            ensure_sqlite_file(db_url).await?;
        }

        for attempt in 1..=attempts {
            let probe = async {
                let mut opt = ConnectOptions::new(db_url.to_string());
                opt.max_connections(1)
                    .connect_timeout(interval.max(Duration::from_secs(1)))
                    .sqlx_logging(false);
                let conn = Database::connect(opt).await?;
                ping(&conn).await?;
                conn.close().await?;
                Ok::<(), anyhow::Error>(())
            };

            match probe.await {
                Ok(()) => {
                    info!("Database is now available");
                    return Ok(());
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Database unavailable, waiting {:?}...", interval);
                    if attempt < attempts {
                        tokio::time::sleep(interval).await;
                    }
                }
            }
        }

        anyhow::bail!("Database still unavailable after {attempts} attempts")
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn attribute_repo(&self, kind: AttributeKind) -> repositories::attribute::AttributeRepository {
        repositories::attribute::AttributeRepository::new(self.conn.clone(), kind)
    }

    #[must_use]
    pub fn recipe_repo(&self) -> repositories::recipe::RecipeRepository {
        repositories::recipe::RecipeRepository::new(self.conn.clone())
    }

    // ========== Accounts ==========

    pub async fn create_user(&self, user: NewUser) -> Result<Account> {
        self.user_repo().create(user).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(Account, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<Account>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_password_hash(&self, id: UserId) -> Result<Option<String>> {
        self.user_repo().password_hash(id).await
    }

    pub async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<Account> {
        self.user_repo().update(id, changes).await
    }

    // ========== Tokens ==========

    pub async fn get_or_create_token(&self, user_id: UserId) -> Result<String> {
        self.token_repo().get_or_create(user_id).await
    }

    pub async fn find_account_by_token(&self, key: &str) -> Result<Option<Account>> {
        self.token_repo().find_account(key).await
    }

    // ========== Tags / Ingredients ==========

    pub async fn list_attributes(
        &self,
        kind: AttributeKind,
        owner: UserId,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>> {
        self.attribute_repo(kind).list(owner, assigned_only).await
    }

    pub async fn create_attribute(
        &self,
        kind: AttributeKind,
        owner: UserId,
        name: &str,
    ) -> Result<Attribute> {
        self.attribute_repo(kind).create(owner, name).await
    }

    pub async fn owned_attribute_ids(
        &self,
        kind: AttributeKind,
        owner: UserId,
        ids: &[i32],
    ) -> Result<Vec<i32>> {
        self.attribute_repo(kind).owned_ids(owner, ids).await
    }

    // ========== Recipes ==========

    pub async fn list_recipes(&self, owner: UserId, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        self.recipe_repo().list(owner, filter).await
    }

    pub async fn get_recipe(&self, owner: UserId, id: RecipeId) -> Result<Option<Recipe>> {
        self.recipe_repo().get(owner, id).await
    }

    pub async fn create_recipe(&self, owner: UserId, fields: &RecipeFields) -> Result<Recipe> {
        self.recipe_repo().create(owner, fields).await
    }

    pub async fn update_recipe(
        &self,
        owner: UserId,
        id: RecipeId,
        patch: &RecipePatch,
    ) -> Result<Option<Recipe>> {
        self.recipe_repo().update(owner, id, patch).await
    }

    pub async fn set_recipe_image(
        &self,
        owner: UserId,
        id: RecipeId,
        image: &str,
    ) -> Result<Option<Recipe>> {
        self.recipe_repo().set_image(owner, id, image).await
    }

    pub async fn delete_recipe(&self, owner: UserId, id: RecipeId) -> Result<bool> {
        self.recipe_repo().delete(owner, id).await
    }
}

async fn ping<C: ConnectionTrait>(conn: &C) -> Result<()> {
    let backend = conn.get_database_backend();
    conn.query_one(Statement::from_string(backend, "SELECT 1".to_string()))
        .await?;
    Ok(())
}

fn is_in_memory(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}

/// SQLite refuses to open a missing file unless `mode=rwc` is given, so the
/// file and its directory are created up front.
async fn ensure_sqlite_file(db_url: &str) -> Result<()> {
    let Some(path_str) = db_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path_str = path_str.trim_start_matches("//");
    let path_str = path_str.split('?').next().unwrap_or(path_str);

    if let Some(parent) = Path::new(path_str).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.ok();
    }
    if !Path::new(path_str).exists() {
        tokio::fs::File::create(path_str).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file.db?mode=memory"));
        assert!(!is_in_memory("sqlite:data/recipebox.db"));
    }

    #[tokio::test]
    async fn test_wait_for_in_memory_database() {
        Store::wait_for_database("sqlite::memory:", 1, Duration::from_millis(10))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_database_gives_up() {
        let result =
            Store::wait_for_database("postgres://nowhere.invalid/db", 2, Duration::from_millis(10))
                .await;
        assert!(result.is_err());
    }
}
