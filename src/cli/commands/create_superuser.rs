//! Create-superuser command handler

use crate::config::Config;
use crate::db::Store;
use crate::services::{AccountService, SeaOrmAccountService};

pub async fn cmd_create_superuser(
    config: &Config,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let accounts = SeaOrmAccountService::new(store, config.security.clone());

    let account = accounts
        .create_superuser(email, password)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create superuser: {e}"))?;

    println!("✓ Superuser {} created (ID: {})", account.email, account.id);
    Ok(())
}
