//! check-db command handler
//!
//! Opens a small pool and asks PostgreSQL for its clock.

use crate::config::{DatabaseConfig, Settings};
use crate::db::{establish_async_connection_pool, server_time};
use crate::error::AppResult;

/// Handler for the check-db command
pub struct CheckDbCommandHandler {
    config: Settings,
}

impl CheckDbCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Prints the server time on success; any failure is returned.
    pub async fn execute(&self) -> AppResult<()> {
        self.config.database.validate()?;

        let pool = establish_async_connection_pool(&probe_config(&self.config.database)).await?;
        let now = server_time(&pool).await?;

        println!("✓ Connected. Server time: {}", now);
        tracing::info!(
            server_time = %now,
            ssl_mode = %self.config.database.ssl_mode.as_str(),
            "Database connectivity check passed"
        );
        Ok(())
    }
}

/// A single connection is enough for one query.
fn probe_config(database: &DatabaseConfig) -> DatabaseConfig {
    DatabaseConfig {
        max_connections: 1,
        min_connections: 1,
        ..database.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SslMode;

    #[test]
    fn test_probe_config_uses_one_connection() {
        let database = DatabaseConfig {
            url: "postgres://localhost/accounts".to_string(),
            max_connections: 20,
            min_connections: 5,
            ssl_mode: SslMode::Require,
            ..DatabaseConfig::default()
        };

        let probe = probe_config(&database);
        assert_eq!(probe.max_connections, 1);
        assert_eq!(probe.min_connections, 1);
        assert_eq!(probe.url, database.url);
        assert_eq!(probe.ssl_mode, SslMode::Require);
    }

    #[tokio::test]
    async fn test_check_db_requires_database_url() {
        let result = CheckDbCommandHandler::new(Settings::default()).execute().await;
        assert!(result.is_err());
    }
}
