//! Serve command handler
//!
//! Either validates the configuration (`--dry-run`) or runs the server.

use crate::config::Settings;
use crate::error::AppResult;
use crate::server::Server;

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Runs the server until shutdown, or only validates with `dry_run`.
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }
        Server::new(self.config).run().await?;
        Ok(())
    }

    /// Validate configuration without starting the server
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        match self.config.server.static_dir() {
            Some(dir) if dir.is_dir() => println!("✓ Static files from: {}", dir.display()),
            Some(dir) => println!("! Static directory not found: {}", dir.display()),
            None => println!("✓ Static file serving disabled"),
        }
        println!(
            "✓ Login rate limit: {}",
            if self.config.rate_limit.enabled {
                format!(
                    "{} attempts per {}s",
                    self.config.rate_limit.login_max_attempts,
                    self.config.rate_limit.login_window_seconds
                )
            } else {
                "disabled".to_string()
            }
        );
        println!("Dry run completed successfully");
        Ok(())
    }
}
