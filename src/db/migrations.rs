//! Embedded schema migrations.
//!
//! Migrations run over a blocking `PgConnection` on the blocking thread pool,
//! since `MigrationHarness` is synchronous.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::config::DatabaseConfig;
use crate::db::tls::libpq_url;
use crate::error::{AppError, AppResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Names of migrations not yet applied to the configured database.
pub async fn pending_migrations(database: &DatabaseConfig) -> AppResult<Vec<String>> {
    with_connection(database, "check pending migrations", |conn| {
        conn.pending_migrations(MIGRATIONS)
            .map(|pending| pending.iter().map(|m| m.name().to_string()).collect())
    })
    .await
}

/// Apply every pending migration, returning the applied versions in order.
pub async fn run_pending_migrations(database: &DatabaseConfig) -> AppResult<Vec<String>> {
    with_connection(database, "run pending migrations", |conn| {
        conn.run_pending_migrations(MIGRATIONS)
            .map(|applied| applied.iter().map(|v| v.to_string()).collect())
    })
    .await
}

/// Revert up to `steps` of the most recent migrations.
///
/// Stops early, without error, once nothing is left to revert.
pub async fn revert_migrations(database: &DatabaseConfig, steps: u32) -> AppResult<Vec<String>> {
    with_connection(database, "revert migrations", move |conn| {
        let mut reverted = Vec::new();
        for _ in 0..steps {
            if conn.applied_migrations()?.is_empty() {
                break;
            }
            reverted.push(conn.revert_last_migration(MIGRATIONS)?.to_string());
        }
        Ok(reverted)
    })
    .await
}

type MigrationResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

async fn with_connection<T, F>(
    database: &DatabaseConfig,
    operation: &'static str,
    f: F,
) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> MigrationResult<T> + Send + 'static,
{
    let database_url = libpq_url(database);

    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url).map_err(|e| AppError::Database {
            operation: format!("establish connection to {operation}"),
            source: anyhow::Error::from(e),
        })?;

        f(&mut conn).map_err(|e| AppError::Database {
            operation: operation.to_string(),
            source: anyhow::anyhow!("Migration error: {}", e),
        })
    })
    .await
    .map_err(|e| AppError::Internal {
        source: anyhow::Error::from(e),
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::migration::MigrationSource;

    #[test]
    fn test_users_migration_is_embedded() {
        let migrations = MigrationSource::<diesel::pg::Pg>::migrations(&MIGRATIONS).unwrap();
        let names: Vec<String> = migrations.iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with("create_users"), "{names:?}");
    }
}
