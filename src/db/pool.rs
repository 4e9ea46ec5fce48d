//! Async database connection pool implementation.
//!
//! Uses bb8 connection pool manager with diesel_async for PostgreSQL connections.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::RunQueryDsl;
use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};
use futures::FutureExt;

use crate::config::DatabaseConfig;
use crate::db::tls::{establish_connection, tls_connector};
use crate::error::{AppError, AppResult};

/// Async connection pool type alias.
///
/// bb8::Pool internally uses Arc, so Clone is cheap (just reference count increment).
pub type AsyncDbPool = Pool<AsyncPgConnection>;

/// Creates an async database connection pool sized by `config`.
///
/// Connections are opened lazily by bb8; `min_connections` are kept idle
/// once the pool has warmed up. Each connection uses TLS as
/// `config.ssl_mode` directs.
///
/// # Errors
///
/// - `AppError::Configuration` if the TLS client cannot be built
/// - `AppError::ConnectionPool` if bb8 cannot build the pool
pub async fn establish_async_connection_pool(config: &DatabaseConfig) -> AppResult<AsyncDbPool> {
    let tls = tls_connector(config.ssl_mode).map_err(|e| AppError::Configuration {
        key: "database.ssl_mode".to_string(),
        source: anyhow::Error::from(e),
    })?;

    let mut manager_config = ManagerConfig::default();
    manager_config.custom_setup = Box::new(move |url| establish_connection(url, tls.clone()).boxed());

    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
        config.url.as_str(),
        manager_config,
    );

    Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .build(manager)
        .await
        .map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })
}

/// Round-trip `SELECT now()` through the pool and return the server clock.
pub async fn server_time(pool: &AsyncDbPool) -> AppResult<jiff::Timestamp> {
    let mut conn = pool.get().await?;

    let now: std::time::SystemTime = diesel::select(diesel::dsl::now)
        .get_result(&mut conn)
        .await
        .map_err(|e| AppError::Database {
            operation: "select server time".to_string(),
            source: anyhow::Error::from(e),
        })?;

    jiff::Timestamp::try_from(now).map_err(|e| AppError::Internal {
        source: anyhow::Error::from(e),
    })
}
