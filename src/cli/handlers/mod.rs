//! Command handlers for CLI operations
//!
//! One handler per subcommand, separated from parsing and validation.

pub mod check_db;
pub mod migrate;
pub mod serve;

pub use check_db::CheckDbCommandHandler;
pub use migrate::MigrateCommandHandler;
pub use serve::ServeCommandHandler;
