//! Database connection and initialization.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::backoff::Backoff;
use crate::config::Config;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Open the SQLite database and run migrations.
///
/// Creates the database file and its parent directory if missing.
pub async fn init_database(db_path: &str, max_connections: u32) -> Result<Database> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!("Connecting to database: {}", db_path);

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", db_path))?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(Database { pool })
}

/// [`init_database`] with exponential backoff between failed attempts.
pub async fn connect_with_retry(config: &Config) -> Result<Database> {
    let mut backoff = Backoff::new(config.database_backoff_min, config.database_backoff_max);
    loop {
        match init_database(&config.database_path, config.database_max_connections).await {
            Ok(db) => return Ok(db),
            Err(err) if backoff.attempt() + 1 < config.database_connect_attempts => {
                let delay = backoff.next_delay();
                warn!(
                    "Failed to open database {}: {} (retrying in {:?})",
                    config.database_path, err, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                return Err(err.context(format!(
                    "maximum retries reached opening database {}",
                    config.database_path
                )))
            }
        }
    }
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let migration_sql = include_str!("../../migrations/001_init.sql");

    info!("Running database migrations...");

    for statement in migration_sql.split(';') {
        let statement: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }

        if let Err(e) = sqlx::query(statement).execute(pool).await {
            if e.to_string().contains("already exists") {
                continue;
            }
            anyhow::bail!("Migration failed: {}", e);
        }
    }

    info!("Database migrations complete");
    Ok(())
}
