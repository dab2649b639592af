//! Logging bootstrap
//!
//! Initializes the global `tracing` subscriber from configuration. The
//! minimum level comes from `host.logger.min_level` unless `RUST_LOG`
//! is set, in which case the environment filter wins.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use yaxconfig::get_config;

/// Initializes the tracing subscriber
///
/// Safe to call once at process start. Subsequent calls are ignored
/// (the global default can only be installed once).
pub fn init_logging() {
    let config = get_config();
    let min_level = config
        .get_log_min_level()
        .unwrap_or_else(|_| "INFO".to_string());
    let enable_console = config.get_log_enable_console().unwrap_or(true);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(min_level.to_lowercase()));

    if enable_console {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry().with(filter).try_init();
    }

    // The config loader ran before the subscriber existed, so its own
    // log lines were dropped; repeat the essentials.
    tracing::info!(
        config_dir = %config.dir(),
        config_file = %config.file(),
        "Configuration loaded"
    );
}
