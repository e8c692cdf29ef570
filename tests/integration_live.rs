mod common;

/// Full run against the real search API and object store.
/// Needs the credential variables plus LIVE_TEST_BUCKET.
#[cfg(feature = "integration-tests")]
#[tokio::test]
async fn live_run_round_trips_through_the_bucket() {
	use clap::Parser;
	use tweet_ingest::observability::MetricsRegistry;
	use tweet_ingest::{Cli, config, run};

	if !common::check_live_enabled() {
		return;
	}
	let Ok(bucket) = std::env::var("LIVE_TEST_BUCKET") else {
		eprintln!("Skipping live integration test; LIVE_TEST_BUCKET is not set");
		return;
	};

	let cli = Cli::try_parse_from([
		"tweet-ingest",
		"-s",
		"#insee",
		"-l",
		"fr",
		"-r",
		"mixed",
		"-m",
		"5",
		"-b",
		bucket.as_str(),
		"-o",
		"integration-tests",
	])
	.expect("parse");
	let settings = config::load().unwrap_or_default();
	let metrics = MetricsRegistry::new().expect("metrics");

	let report = run(&cli, &settings, &metrics).await.expect("live run");

	assert!(report.fetched <= 5);
	assert_eq!(report.read_back.len(), report.fetched);
	assert!(
		report
			.receipt
			.location
			.path()
			.starts_with("integration-tests/tweet_")
	);
}
