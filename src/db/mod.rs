//! Database access: async PostgreSQL connection pooling using diesel_async
//! with bb8 over optional rustls TLS, plus the embedded schema migrations.

mod migrations;
mod pool;
mod tls;

pub use migrations::{MIGRATIONS, pending_migrations, revert_migrations, run_pending_migrations};
pub use pool::{AsyncDbPool, establish_async_connection_pool, server_time};
