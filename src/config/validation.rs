//! Configuration validation logic

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, FileSettings, LoggerSettings, RateLimitConfig, ServerConfig, Settings,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// URL schemes accepted by the diesel PostgreSQL backend
const VALID_DATABASE_SCHEMES: &[&str] = &["postgres://", "postgresql://"];

impl ServerConfig {
    /// # Validation Rules
    /// - Host must not be blank
    /// - Port must be between 1 and 65535
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::validation(
                "server.host",
                "Host is required. Use 127.0.0.1 for local access or 0.0.0.0 for all interfaces.",
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// # Validation Rules
    /// - URL must be a non-empty `postgres://` or `postgresql://` URL
    /// - Pool bounds must be positive with min not exceeding max
    /// - Connection timeout must be positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Set database.url, EDGEBROOK_DATABASE__URL or DATABASE_URL.",
            ));
        }

        if !VALID_DATABASE_SCHEMES
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
        {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::validation(
                "database.min_connections",
                format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            ));
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// # Validation Rules
    /// - Leading level must be one of: trace, debug, info, warn, error
    /// - At least one of console or file output must be enabled
    /// - File settings must be consistent
    pub fn validate(&self) -> Result<(), ConfigError> {
        let head = self.level.split(',').next().unwrap_or_default().trim();
        if !VALID_LOG_LEVELS.contains(&head.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()
    }
}

impl RateLimitConfig {
    /// Limits only matter while the limiter is enabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        if self.login_max_attempts == 0 {
            return Err(ConfigError::validation(
                "rate_limit.login_max_attempts",
                "Login attempts per window must be greater than 0. Disable the limiter instead.",
            ));
        }

        if self.login_window_seconds == 0 {
            return Err(ConfigError::validation(
                "rate_limit.login_window_seconds",
                "Login window must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate every section, returning the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logger.validate()?;
        self.rate_limit.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("Expected ValidationError, got {other:?}"),
        }
    }

    fn valid_database() -> DatabaseConfig {
        DatabaseConfig {
            url: "postgres://localhost/accounts".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_server_config_rules() {
        assert!(ServerConfig::default().validate().is_ok());

        let zero_port = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(field_of(zero_port.validate().unwrap_err()), "server.port");

        let blank_host = ServerConfig {
            host: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(blank_host.validate().unwrap_err()), "server.host");
    }

    #[test]
    fn test_database_url_required_and_postgres_only() {
        assert_eq!(
            field_of(DatabaseConfig::default().validate().unwrap_err()),
            "database.url"
        );

        let mysql = DatabaseConfig {
            url: "mysql://localhost/accounts".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(mysql.validate().unwrap_err()), "database.url");

        let postgresql = DatabaseConfig {
            url: "postgresql://user:pw@db:5432/accounts".to_string(),
            ..Default::default()
        };
        assert!(postgresql.validate().is_ok());
    }

    #[test]
    fn test_database_pool_bounds() {
        let inverted = DatabaseConfig {
            min_connections: 20,
            max_connections: 5,
            ..valid_database()
        };
        assert_eq!(
            field_of(inverted.validate().unwrap_err()),
            "database.min_connections"
        );

        let no_timeout = DatabaseConfig {
            connection_timeout: 0,
            ..valid_database()
        };
        assert_eq!(
            field_of(no_timeout.validate().unwrap_err()),
            "database.connection_timeout"
        );
    }

    #[test]
    fn test_logger_level_accepts_directives() {
        let settings = LoggerSettings {
            level: "info,tower_http=debug".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());

        let bad = LoggerSettings {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(bad.validate().unwrap_err()), "logger.level");
    }

    #[test]
    fn test_logger_requires_an_output() {
        let mut settings = LoggerSettings::default();
        settings.console.enabled = false;
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger");
    }

    #[test]
    fn test_rate_limit_rules_skipped_when_disabled() {
        let disabled = RateLimitConfig {
            enabled: false,
            login_max_attempts: 0,
            ..Default::default()
        };
        assert!(disabled.validate().is_ok());

        let enabled = RateLimitConfig {
            login_max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(
            field_of(enabled.validate().unwrap_err()),
            "rate_limit.login_max_attempts"
        );
    }

    #[test]
    fn test_settings_validate_checks_every_section() {
        let mut settings = Settings {
            database: valid_database(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());

        settings.rate_limit.login_window_seconds = 0;
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "rate_limit.login_window_seconds"
        );
    }
}
