//! Per-client rate limit for the login route, backed by `tower_governor`.
//!
//! Each client starts with `login_max_attempts` and regains the full budget
//! over `login_window_seconds`. Clients are keyed by peer address, or by
//! forwarding headers when `trust_forwarded_for` is set.

use std::sync::Arc;
use std::time::Duration;

use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor};
use tower_governor::GovernorLayer;
use utoipa_axum::router::OpenApiRouter;

use crate::config::{ConfigError, RateLimitConfig};
use crate::state::AppState;

/// How often idle client entries are dropped from the limiter
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Time for one spent attempt to come back.
pub fn replenish_interval(config: &RateLimitConfig) -> Duration {
    Duration::from_secs(config.login_window_seconds) / config.login_max_attempts.max(1)
}

// Key extractors produce distinct layer types, so each branch builds its own.
macro_rules! governed {
    ($routes:expr, $extractor:expr, $config:expr) => {{
        let governor = GovernorConfigBuilder::default()
            .key_extractor($extractor)
            .period(replenish_interval($config))
            .burst_size($config.login_max_attempts)
            .finish()
            .ok_or_else(|| invalid_limits($config))?;

        let limiter = governor.limiter().clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
                loop {
                    ticker.tick().await;
                    limiter.retain_recent();
                    tracing::trace!(tracked = limiter.len(), "Pruned login rate limit state");
                }
            });
        }

        $routes.layer(GovernorLayer::new(Arc::new(governor)))
    }};
}

/// Wraps `routes` in the login rate limit described by `config`.
///
/// Disabled limits return `routes` untouched.
///
/// # Errors
///
/// `ConfigError::ValidationError` when the limits describe no usable quota.
pub fn limit_login_routes(
    routes: OpenApiRouter<AppState>,
    config: &RateLimitConfig,
) -> Result<OpenApiRouter<AppState>, ConfigError> {
    if !config.enabled {
        return Ok(routes);
    }

    let routes = if config.trust_forwarded_for {
        governed!(routes, SmartIpKeyExtractor, config)
    } else {
        governed!(routes, PeerIpKeyExtractor, config)
    };
    Ok(routes)
}

fn invalid_limits(config: &RateLimitConfig) -> ConfigError {
    ConfigError::validation(
        "rate_limit",
        format!(
            "{} attempts per {}s is not a usable login rate limit",
            config.login_max_attempts, config.login_window_seconds
        ),
    )
}
