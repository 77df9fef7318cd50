use ckconfig::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installe le subscriber global.
///
/// `RUST_LOG` a priorité ; sinon le niveau vient de `host.logger.min_level`.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config
            .get_log_min_level()
            .unwrap_or_else(|_| "INFO".to_string())
            .to_lowercase();
        EnvFilter::new(level)
    });

    let enable_console = config.get_log_enable_console().unwrap_or(true);

    let registry = tracing_subscriber::registry().with(filter);
    if enable_console {
        registry
            .with(fmt::layer().with_target(true).with_level(true).with_ansi(true))
            .init();
    } else {
        registry.init();
    }
}
