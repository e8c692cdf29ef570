use std::collections::HashMap;
use std::env;

use clap::Parser;
use tweet_ingest::config::Settings;
use tweet_ingest::credentials::{
	CredentialError, SEARCH_ENV_VARS, STORE_ENV_VARS, SearchCredentials, StoreCredentials,
};
use tweet_ingest::observability::MetricsRegistry;
use tweet_ingest::{Cli, PipelineError, run};

/// Missing credentials end the run before the search API is contacted.
/// This is the only test in this binary that touches the process environment.
#[cfg(feature = "unit-tests")]
#[tokio::test]
async fn run_without_search_credentials_fails_before_network() {
	for name in SEARCH_ENV_VARS {
		unsafe { env::remove_var(name) };
	}
	unsafe { env::set_var("TWITTER_CONSUMER_KEY", "only-this-one") };

	let cli = Cli::try_parse_from(["tweet-ingest", "-s", "#insee", "-b", "bucket", "-o", "out"])
		.expect("parse");
	// Nothing listens here; reaching the network would fail differently
	let settings = Settings {
		search_api_url: "http://127.0.0.1:9/1.1".parse().expect("url"),
		max_retries: 0,
		..Settings::default()
	};
	let metrics = MetricsRegistry::new().expect("metrics");

	let err = run(&cli, &settings, &metrics).await.unwrap_err();
	match err {
		PipelineError::Credentials(CredentialError { service, missing }) => {
			assert_eq!(service, "search API");
			assert_eq!(
				missing,
				[
					"TWITTER_CONSUMER_SECRET",
					"TWITTER_ACCESS_TOKEN",
					"TWITTER_ACCESS_TOKEN_SECRET"
				]
			);
		}
		other => panic!("expected a credentials error, got {}", other),
	}
	assert_eq!(metrics.posts_fetched_total.get(), 0);

	unsafe { env::remove_var("TWITTER_CONSUMER_KEY") };
}

#[cfg(feature = "unit-tests")]
#[test]
fn store_credentials_report_every_missing_variable() {
	let env: HashMap<&str, &str> = [("AWS_S3_ENDPOINT", "https://minio.example:9000")]
		.into_iter()
		.collect();
	let err = StoreCredentials::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap_err();

	assert_eq!(err.missing, &STORE_ENV_VARS[1..]);
	let message = err.to_string();
	assert!(message.contains("AWS_ACCESS_KEY_ID"));
	assert!(message.contains("AWS_SESSION_TOKEN"));
}

#[cfg(feature = "unit-tests")]
#[test]
fn secrets_never_reach_debug_output() {
	let search = SearchCredentials::from_lookup(|k| Some(format!("secret-{}", k))).expect("search");
	let store = StoreCredentials::from_lookup(|k| Some(format!("secret-{}", k))).expect("store");

	let rendered = format!("{:?} {:?}", search, store);
	for name in SEARCH_ENV_VARS.iter().chain(STORE_ENV_VARS[1..].iter()) {
		assert!(
			!rendered.contains(&format!("secret-{}", name)),
			"{} leaked in {}",
			name,
			rendered
		);
	}
	// The endpoint is not a secret
	assert!(rendered.contains("secret-AWS_S3_ENDPOINT"));
}
