use anyhow::{Context, Result};
use qcforms_cli::{AppConfig, StorageBackend};
use qcforms_db_postgres::{create_pool, migrations};

use crate::output::print_success;

pub async fn run(config: &AppConfig) -> Result<()> {
    if config.storage.backend != StorageBackend::Postgres {
        anyhow::bail!("Migrations only apply to the postgres backend (use --backend postgres)");
    }
    let pool = create_pool(&config.storage.postgres)
        .await
        .context("Failed to connect to PostgreSQL")?;
    migrations::run(&pool).await.context("Migration failed")?;
    print_success(&format!("Applied {} migration(s)", migrations::count()));
    Ok(())
}
