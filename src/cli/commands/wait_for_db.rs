//! Wait-for-database command handler

use std::time::Duration;

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_wait_for_db(config: &Config) -> anyhow::Result<()> {
    Store::wait_for_database(
        &config.general.database_path,
        config.database.wait_attempts,
        Duration::from_millis(config.database.wait_interval_ms),
    )
    .await?;

    println!("✓ Database available!");
    Ok(())
}
