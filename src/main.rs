use std::process::ExitCode;

use clap::Parser;
use tweet_ingest::observability::{MetricsRegistry, init_logging};
use tweet_ingest::{Cli, config, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	let cli = Cli::parse();

	let settings = match config::load() {
		Ok(s) => s,
		Err(e) => {
			eprintln!("Warning: failed to load config, using defaults: {}", e);
			config::Settings::default()
		}
	};

	if let Err(e) = init_logging(settings.log_level) {
		eprintln!("{}", e);
	}

	let metrics = match MetricsRegistry::new() {
		Ok(m) => m,
		Err(e) => {
			eprintln!("Failed to create metrics registry: {}", e);
			return ExitCode::FAILURE;
		}
	};

	let outcome = run(&cli, &settings, &metrics).await;

	metrics.record_outcome(outcome.is_ok());
	if let Some(path) = settings.metrics_textfile.as_deref() {
		if let Err(e) = metrics.write_textfile(path) {
			tracing::warn!(path, error = %e, "failed to write metrics textfile");
		}
	}

	match outcome {
		Ok(report) => {
			println!(
				"Wrote {} posts ({} bytes) to {}; read back {} rows",
				report.fetched,
				report.receipt.bytes,
				report.receipt.location,
				report.read_back.len()
			);
			match report.read_back.preview(settings.preview_rows) {
				Ok(preview) => println!("{}", preview),
				Err(e) => eprintln!("Failed to render preview: {}", e),
			}
			ExitCode::SUCCESS
		}
		Err(e) => {
			tracing::error!(error = %e, "ingestion run failed");
			eprintln!("Error: {}", e);
			ExitCode::FAILURE
		}
	}
}
