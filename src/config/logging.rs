//! Logging setup

use super::settings::{LogFormat, LoggingSettings};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter for the given settings; a non-empty `RUST_LOG` wins over the
/// configured level
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
	match std::env::var(EnvFilter::DEFAULT_ENV) {
		Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
		_ => EnvFilter::new(&settings.level),
	}
}

/// Install the global subscriber, writing to stderr
///
/// Calling it again once a subscriber is installed has no effect.
pub fn init_logging(settings: &LoggingSettings) {
	let registry = tracing_subscriber::registry().with(env_filter(settings));
	let result = match settings.format {
		LogFormat::Full => registry
			.with(fmt::layer().with_writer(std::io::stderr))
			.try_init(),
		LogFormat::Compact => registry
			.with(fmt::layer().compact().with_writer(std::io::stderr))
			.try_init(),
	};
	if let Err(err) = result {
		tracing::debug!(error = %err, "tracing subscriber already installed");
	}
}
