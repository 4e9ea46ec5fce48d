//! Command executor for dispatching CLI commands

use super::handlers::{CheckDbCommandHandler, MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::AppResult;

/// Execute the parsed command with merged settings.
///
/// No subcommand means `serve`. Serving blocks until shutdown.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    warn_on_risky_args(cli);

    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(*dry_run).await
        }
        None => ServeCommandHandler::new(settings).execute(false).await,
        Some(Commands::Migrate { dry_run, rollback }) => {
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await
        }
        Some(Commands::CheckDb) => CheckDbCommandHandler::new(settings).execute().await,
    }
}

/// Legal but probably unintended argument combinations
fn risky_arg_warnings(cli: &Cli) -> Vec<String> {
    let mut warnings = Vec::new();

    match &cli.command {
        Some(Commands::Serve {
            host: Some(host),
            port: Some(port),
            ..
        }) if *port < 1024 && host == "0.0.0.0" => {
            warnings.push(format!(
                "Binding to 0.0.0.0 on port {} usually requires elevated privileges",
                port
            ));
        }
        Some(Commands::Migrate {
            rollback: Some(steps),
            ..
        }) if *steps > 10 => {
            warnings.push(format!(
                "Rolling back {} migrations may drop user data; consider smaller steps",
                steps
            ));
        }
        _ => {}
    }

    warnings
}

fn warn_on_risky_args(cli: &Cli) {
    for warning in risky_arg_warnings(cli) {
        tracing::warn!("{}", warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const BIN: &str = "edgebrook-accounts";

    fn create_valid_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/accounts".to_string();
        config
    }

    #[tokio::test]
    async fn test_execute_serve_dry_run() {
        let cli = Cli::try_parse_from([BIN, "serve", "--dry-run"]).unwrap();
        assert!(execute_command(&cli, create_valid_config()).await.is_ok());
    }

    #[tokio::test]
    async fn test_execute_migrate_zero_rollback_fails_before_connecting() {
        let cli = Cli {
            command: Some(Commands::Migrate {
                dry_run: false,
                rollback: Some(0),
            }),
            config: None,
            env: None,
            verbose: false,
            quiet: false,
        };
        assert!(execute_command(&cli, create_valid_config()).await.is_err());
    }

    #[test]
    fn test_risky_arg_warnings() {
        let cli = Cli::try_parse_from([BIN, "serve", "--host", "0.0.0.0", "--port", "80"]).unwrap();
        assert_eq!(risky_arg_warnings(&cli).len(), 1);

        let cli = Cli::try_parse_from([BIN, "migrate", "--rollback", "20"]).unwrap();
        assert_eq!(risky_arg_warnings(&cli).len(), 1);

        let cli = Cli::try_parse_from([BIN, "serve", "--port", "8080"]).unwrap();
        assert!(risky_arg_warnings(&cli).is_empty());
    }
}
