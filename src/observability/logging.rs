use log::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured JSON logging to stderr with contextual fields.
///
/// `RUST_LOG` takes precedence; otherwise `default_level` applies. Stdout is
/// left to the console report. `log` records from dependencies and from this
/// crate are bridged into the same subscriber.
pub fn init_logging(default_level: Level) -> anyhow::Result<()> {
	let fallback = default_level.as_str().to_ascii_lowercase();
	let env_filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(&fallback))
		.unwrap_or_else(|_| EnvFilter::new("info"));

	let json_layer = tracing_subscriber::fmt::layer()
		.json()
		.with_writer(std::io::stderr)
		.with_current_span(true)
		.with_span_list(true)
		.with_target(true)
		.with_level(true)
		.with_file(true)
		.with_line_number(true);

	tracing_subscriber::registry()
		.with(env_filter)
		.with(json_layer)
		.try_init()
		.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

	Ok(())
}

#[cfg(feature = "unit-tests")]
mod tests {
	#[test]
	fn logging_installs_once_per_process() {
		// Whichever call runs first owns the global subscriber
		let _ = super::init_logging(log::Level::Warn);
		let err = super::init_logging(log::Level::Debug).unwrap_err();
		assert!(err.to_string().contains("Failed to initialize logging"));
	}
}
