//! Tracing subscriber setup for applications embedding the client.

use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

use crate::config::Config;

/// Install a global tracing subscriber.
///
/// `RUST_LOG` wins over `Config::log_level`. Fails if a global subscriber is
/// already set.
pub fn init_tracing(config: &Config) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!config.log_json).then(|| tracing_subscriber::fmt::layer());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
}
