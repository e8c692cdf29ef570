//! The ingestion run: search, normalize, write, read back.
//!
//! Every step is fallible and the first failure ends the run; there is no
//! checkpointing, a failed run is simply started again.

use std::time::Instant;

use chrono::Local;
use thiserror::Error;

use crate::cli::Cli;
use crate::config::Settings;
use crate::credentials::{CredentialError, SearchCredentials, StoreCredentials};
use crate::ingest::{self, PostTable};
use crate::observability::MetricsRegistry;
use crate::search::{PostSource, SearchApiConfig, SearchError, SearchQuery, TwitterClient};
use crate::storage::{StorageLocation, StorageReadError, StorageWriteError, StoreSession, WriteReceipt};

#[derive(Debug, Error)]
pub enum PipelineError {
	#[error(transparent)]
	Credentials(#[from] CredentialError),

	#[error("invalid output location: {0}")]
	Location(#[from] object_store::path::Error),

	#[error("search failed: {0}")]
	Search(#[from] SearchError),

	#[error("writing the table failed: {0}")]
	Write(#[from] StorageWriteError),

	#[error("reading the table back failed: {0}")]
	ReadBack(#[from] StorageReadError),
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunReport {
	pub fetched: usize,
	pub receipt: WriteReceipt,
	pub read_back: PostTable,
}

/// Full run against the real services, with credentials from the environment.
pub async fn run(
	cli: &Cli,
	settings: &Settings,
	metrics: &MetricsRegistry,
) -> Result<RunReport, PipelineError> {
	// Both credential sets are checked before the first network call
	let search_credentials = SearchCredentials::from_env()?;
	let store_credentials = StoreCredentials::from_env()?;

	let query = cli.query(settings);
	let location = StorageLocation::dated(
		cli.bucket_name.as_str(),
		&cli.output_path,
		Local::now().date_naive(),
	)?;

	let client = TwitterClient::connect(search_credentials, SearchApiConfig::from(settings)).await?;
	match client.account() {
		Some(account) => println!("Search API authentication OK (@{})", account),
		None => println!("Search API authentication OK"),
	}

	let store = StoreSession::connect(store_credentials, &settings.store_region);

	execute(&client, &store, &query, &location, metrics).await
}

/// Run the steps after authentication against the given source and store.
#[tracing::instrument(skip_all, fields(search_word = %query.search_word, location = %location))]
pub async fn execute<S>(
	source: &S,
	store: &StoreSession,
	query: &SearchQuery,
	location: &StorageLocation,
	metrics: &MetricsRegistry,
) -> Result<RunReport, PipelineError>
where
	S: PostSource + ?Sized + Sync,
{
	let started = Instant::now();
	let results = source.search(query).await?;
	metrics
		.search_duration_seconds
		.observe(started.elapsed().as_secs_f64());

	let fetched = results.remaining();
	metrics.posts_fetched_total.inc_by(fetched as u64);
	tracing::info!(fetched, "search completed");

	let table = ingest::normalize(results);
	let missing = table.missing_cells();
	metrics.missing_cells_total.inc_by(missing as u64);
	if missing > 0 {
		tracing::warn!(missing, "some posts lacked fields; cells left empty");
	}

	let started = Instant::now();
	let receipt = store.write(&table, location).await?;
	metrics.rows_written_total.inc_by(table.len() as u64);
	metrics.bytes_written_total.inc_by(receipt.bytes as u64);
	tracing::info!(rows = table.len(), bytes = receipt.bytes, "table written");

	// Verification only: a failed read does not undo the write
	let read_back = store.read(location).await?;
	metrics
		.store_duration_seconds
		.observe(started.elapsed().as_secs_f64());
	if read_back.len() != table.len() {
		tracing::warn!(
			written = table.len(),
			read = read_back.len(),
			"read-back row count differs from what was written"
		);
	}

	Ok(RunReport {
		fetched,
		receipt,
		read_back,
	})
}

#[cfg(test)]
#[cfg(feature = "unit-tests")]
mod tests {
	use async_trait::async_trait;
	use serde_json::json;

	use super::*;
	use crate::search::{RawPost, ResultType, SearchResults};
	use crate::storage::MemoryBuckets;

	struct FixedSource(Vec<serde_json::Value>);

	#[async_trait]
	impl PostSource for FixedSource {
		async fn search(&self, _query: &SearchQuery) -> Result<SearchResults, SearchError> {
			Ok(SearchResults::new(
				self.0.iter().cloned().map(RawPost::from).collect(),
			))
		}
	}

	struct FailingSource;

	#[async_trait]
	impl PostSource for FailingSource {
		async fn search(&self, _query: &SearchQuery) -> Result<SearchResults, SearchError> {
			Err(SearchError::UnexpectedPayload("boom".to_string()))
		}
	}

	fn query() -> SearchQuery {
		SearchQuery {
			search_word: "#insee".to_string(),
			language: Some("fr".to_string()),
			result_type: ResultType::Mixed,
			max_count: 5,
		}
	}

	#[tokio::test]
	async fn execute_counts_missing_cells() {
		let source = FixedSource(vec![
			json!({"user": {"name": "Insee"}, "created_at": "x", "text": "a"}),
			json!({"created_at": "y", "text": "b"}),
		]);
		let store = StoreSession::with_provider(MemoryBuckets::new());
		let metrics = MetricsRegistry::new().expect("metrics");

		let report = execute(&source, &store, &query(), &StorageLocation::new("b", "p"), &metrics)
			.await
			.expect("run");

		assert_eq!(report.fetched, 2);
		assert_eq!(report.read_back.len(), 2);
		assert_eq!(metrics.missing_cells_total.get(), 1);
		assert_eq!(metrics.rows_written_total.get(), 2);
	}

	#[tokio::test]
	async fn search_failure_stops_before_write() {
		let store = StoreSession::with_provider(MemoryBuckets::new());
		let metrics = MetricsRegistry::new().expect("metrics");
		let location = StorageLocation::new("b", "p");

		let err = execute(&FailingSource, &store, &query(), &location, &metrics)
			.await
			.unwrap_err();
		assert!(matches!(err, PipelineError::Search(_)));
		assert!(matches!(
			store.read(&location).await,
			Err(StorageReadError::NotFound { .. })
		));
	}
}
