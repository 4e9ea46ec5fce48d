//! Configuration loader
//!
//! `ConfigLoader` merges every configuration source with proper precedence
//! and validates the result.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
pub const CONFIG_DIR_ENV: &str = "EDGEBROOK_CONFIG_DIR";

/// Environment variable for a single configuration file
pub const CONFIG_FILE_ENV: &str = "EDGEBROOK_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

const ENV_PREFIX: &str = "EDGEBROOK";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Unprefixed variables set by hosting platforms, mapped onto config keys.
/// Each applies only when its prefixed counterpart is absent.
const PLATFORM_OVERRIDES: &[(&str, &str, &str)] = &[
    ("DATABASE_URL", "EDGEBROOK_DATABASE__URL", "database.url"),
    ("PORT", "EDGEBROOK_SERVER__PORT", "server.port"),
];

/// Configuration loader that handles layered configuration loading
///
/// Sources, lowest priority first:
/// 1. `default.toml` (optional, built-in defaults otherwise)
/// 2. `{environment}.toml` (optional)
/// 3. `local.toml` (optional)
/// 4. `EDGEBROOK_*` environment variables
/// 5. `DATABASE_URL` / `PORT`, when the matching `EDGEBROOK_*` variable is unset
///
/// With a single configuration file (`EDGEBROOK_CONFIG_FILE` or `--config`)
/// steps 1-3 are replaced by that file.
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `EDGEBROOK_CONFIG_DIR`, `EDGEBROOK_CONFIG_FILE`
    /// and `EDGEBROOK_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both the directory and file variables are set.
    pub fn new() -> Result<Self, ConfigError> {
        let dir_var = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && dir_var.is_some() {
            return Err(ConfigError::mutual_exclusivity(format!(
                "{CONFIG_DIR_ENV} and {CONFIG_FILE_ENV} cannot both be set. \
                 Use {CONFIG_DIR_ENV} for layered configuration or \
                 {CONFIG_FILE_ENV} for a single configuration file."
            )));
        }

        Ok(Self {
            config_dir: dir_var
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Load a single file instead of the layered directory
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Override the environment read from `EDGEBROOK_APP_ENV`
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load, deserialize and validate configuration from all sources.
    ///
    /// # Errors
    ///
    /// - an explicitly named configuration file does not exist
    /// - a source cannot be parsed
    /// - the merged settings fail validation
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings: Settings = self.build_config()?.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match self.config_file {
            Some(ref config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        // EDGEBROOK_SERVER__PORT -> server.port
        let builder = Self::add_env_source(builder);
        let builder = Self::add_platform_overrides(builder)?;

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let layers = [
            "default.toml".to_string(),
            format!("{}.toml", self.environment.as_str()),
            "local.toml".to_string(),
        ];

        layers.iter().try_fold(builder, |builder, name| {
            Self::add_file_source(builder, &self.config_dir.join(name), false)
        })
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        let path_str = path.to_str().ok_or_else(|| {
            ConfigError::ParseError(format!(
                "Configuration path is not valid UTF-8: {}",
                path.display()
            ))
        })?;

        Ok(builder.add_source(File::new(path_str, FileFormat::Toml).required(required)))
    }

    /// `EDGEBROOK_DATABASE__URL` -> `database.url`
    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }

    fn add_platform_overrides(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        PLATFORM_OVERRIDES
            .iter()
            .try_fold(builder, |builder, (plain, prefixed, key)| {
                let prefixed_set = std::env::var(prefixed).is_ok_and(|v| !v.is_empty());
                let value = std::env::var(plain).ok().filter(|v| !v.is_empty());

                match value {
                    Some(value) if !prefixed_set => builder
                        .set_override(*key, value)
                        .map_err(ConfigError::from),
                    _ => Ok(builder),
                }
            })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serializes tests that touch process environment variables
    pub(crate) static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const MANAGED_VARS: &[&str] = &[
        CONFIG_DIR_ENV,
        CONFIG_FILE_ENV,
        AppEnvironment::ENV_VAR,
        "EDGEBROOK_DATABASE__URL",
        "EDGEBROOK_SERVER__PORT",
        "DATABASE_URL",
        "PORT",
    ];

    /// Clears every variable the loader reads and restores them on drop
    pub(crate) struct EnvGuard {
        saved: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        pub(crate) fn clean() -> Self {
            let mut guard = Self { saved: Vec::new() };
            for key in MANAGED_VARS {
                guard.remove(key);
            }
            guard
        }

        pub(crate) fn set(&mut self, key: &str, value: &str) {
            self.saved.push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            self.saved.push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original) in self.saved.iter().rev() {
                unsafe {
                    match original {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    const BASE_CONFIG: &str = r#"
[application]
name = "accounts-test"

[server]
host = "127.0.0.1"
port = 3000

[database]
url = "postgres://localhost/accounts"
max_connections = 10
min_connections = 1
"#;

    #[test]
    fn test_new_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _env = EnvGuard::clean();

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_dir_and_file_are_mutually_exclusive() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/path/to/config.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains(CONFIG_DIR_ENV));
                assert!(msg.contains(CONFIG_FILE_ENV));
            }
            other => panic!("Expected MutualExclusivityError, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_database_url_fails_validation() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();
        let temp_dir = setup_config_dir(&[]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        let err = ConfigLoader::new().unwrap().load().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { ref field, .. } if field == "database.url")
        );
    }

    #[test]
    fn test_layers_apply_in_order() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[
            ("default.toml", BASE_CONFIG),
            ("staging.toml", "[server]\nport = 3001\n[database]\nmax_connections = 40\n"),
            ("local.toml", "[server]\nport = 3002\n"),
        ]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set(AppEnvironment::ENV_VAR, "staging");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");

        assert_eq!(settings.server.port, 3002);
        assert_eq!(settings.database.max_connections, 40);
        assert_eq!(settings.application.name, "accounts-test");
        assert_eq!(settings.database.min_connections, 1);
    }

    #[test]
    fn test_with_environment_overrides_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[
            ("default.toml", BASE_CONFIG),
            ("production.toml", "[server]\nhost = \"0.0.0.0\"\n"),
        ]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set(AppEnvironment::ENV_VAR, "test");

        let loader = ConfigLoader::new()
            .unwrap()
            .with_environment(AppEnvironment::Production);
        let settings = loader.load().unwrap();

        assert_eq!(loader.environment(), AppEnvironment::Production);
        assert_eq!(settings.server.host, "0.0.0.0");
    }

    #[test]
    fn test_prefixed_env_vars_override_files() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[("default.toml", BASE_CONFIG)]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set("EDGEBROOK_SERVER__PORT", "4000");
        env.set("EDGEBROOK_DATABASE__URL", "postgres://env-override/db");

        let settings = ConfigLoader::new().unwrap().load().unwrap();

        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.database.url, "postgres://env-override/db");
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn test_platform_variables_fill_in() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set("DATABASE_URL", "postgres://platform/accounts");
        env.set("PORT", "5055");

        let settings = ConfigLoader::new().unwrap().load().unwrap();

        assert_eq!(settings.database.url, "postgres://platform/accounts");
        assert_eq!(settings.server.port, 5055);
    }

    #[test]
    fn test_prefixed_variable_beats_platform_variable() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set("DATABASE_URL", "postgres://platform/accounts");
        env.set("EDGEBROOK_DATABASE__URL", "postgres://explicit/accounts");

        let settings = ConfigLoader::new().unwrap().load().unwrap();
        assert_eq!(settings.database.url, "postgres://explicit/accounts");
    }

    #[test]
    fn test_single_file_mode_skips_directory() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[("single.toml", BASE_CONFIG)]);
        let loader = ConfigLoader::new()
            .unwrap()
            .with_config_file(temp_dir.path().join("single.toml"));

        let settings = loader.load().unwrap();
        assert_eq!(settings.application.name, "accounts-test");

        let missing = ConfigLoader::new()
            .unwrap()
            .with_config_file(temp_dir.path().join("absent.toml"));
        assert!(matches!(missing.load(), Err(ConfigError::FileNotFound(_))));
    }
}
