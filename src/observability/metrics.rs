use std::path::Path;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder};

const NAMESPACE: &str = "tweet_ingest";

/// Registry for the metrics of a single ingestion run.
///
/// A batch job has no scrape endpoint, so the registry is rendered once at the
/// end of the run and optionally dropped into a node_exporter textfile
/// directory.
pub struct MetricsRegistry {
	registry: Registry,

	pub posts_fetched_total: IntCounter,
	pub rows_written_total: IntCounter,
	pub missing_cells_total: IntCounter,
	pub bytes_written_total: IntCounter,
	pub search_duration_seconds: Histogram,
	pub store_duration_seconds: Histogram,
	pub last_run_success: IntGauge,
	pub last_run_timestamp_seconds: IntGauge,
}

impl MetricsRegistry {
	pub fn new() -> Result<Self, prometheus::Error> {
		let registry = Registry::new();

		let posts_fetched_total = IntCounter::with_opts(
			Opts::new("posts_fetched_total", "Posts returned by the search API").namespace(NAMESPACE),
		)?;
		let rows_written_total = IntCounter::with_opts(
			Opts::new("rows_written_total", "Rows written to the object store").namespace(NAMESPACE),
		)?;
		let missing_cells_total = IntCounter::with_opts(
			Opts::new(
				"missing_cells_total",
				"Table cells left empty because the source post lacked the field",
			)
			.namespace(NAMESPACE),
		)?;
		let bytes_written_total = IntCounter::with_opts(
			Opts::new("bytes_written_total", "Parquet bytes uploaded").namespace(NAMESPACE),
		)?;
		let search_duration_seconds = Histogram::with_opts(
			HistogramOpts::new(
				"search_duration_seconds",
				"Duration of the search request, including rate-limit waits",
			)
			.namespace(NAMESPACE)
			.buckets(vec![0.1, 0.5, 1.0, 5.0, 30.0, 120.0, 900.0]),
		)?;
		let store_duration_seconds = Histogram::with_opts(
			HistogramOpts::new(
				"store_duration_seconds",
				"Duration of object store writes and reads",
			)
			.namespace(NAMESPACE)
			.buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
		)?;
		let last_run_success = IntGauge::with_opts(
			Opts::new("last_run_success", "1 if the last run completed, 0 otherwise")
				.namespace(NAMESPACE),
		)?;
		let last_run_timestamp_seconds = IntGauge::with_opts(
			Opts::new(
				"last_run_timestamp_seconds",
				"Unix time at which the last run finished",
			)
			.namespace(NAMESPACE),
		)?;

		registry.register(Box::new(posts_fetched_total.clone()))?;
		registry.register(Box::new(rows_written_total.clone()))?;
		registry.register(Box::new(missing_cells_total.clone()))?;
		registry.register(Box::new(bytes_written_total.clone()))?;
		registry.register(Box::new(search_duration_seconds.clone()))?;
		registry.register(Box::new(store_duration_seconds.clone()))?;
		registry.register(Box::new(last_run_success.clone()))?;
		registry.register(Box::new(last_run_timestamp_seconds.clone()))?;

		Ok(Self {
			registry,
			posts_fetched_total,
			rows_written_total,
			missing_cells_total,
			bytes_written_total,
			search_duration_seconds,
			store_duration_seconds,
			last_run_success,
			last_run_timestamp_seconds,
		})
	}

	/// Record how the run ended.
	pub fn record_outcome(&self, success: bool) {
		self.last_run_success.set(i64::from(success));
		self.last_run_timestamp_seconds
			.set(chrono::Utc::now().timestamp());
	}

	/// Encode metrics in Prometheus text format
	pub fn encode(&self) -> Result<String, prometheus::Error> {
		TextEncoder::new().encode_to_string(&self.registry.gather())
	}

	/// Write the encoded metrics to `path` atomically (temp file + rename), so
	/// a collector never reads a half-written file.
	pub fn write_textfile(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
		let path = path.as_ref();
		let tmp = path.with_extension("prom.tmp");
		std::fs::write(&tmp, self.encode()?)?;
		std::fs::rename(&tmp, path)?;
		Ok(())
	}
}

#[cfg(feature = "unit-tests")]
mod tests {
	#[test]
	fn metrics_registry_creation() {
		let registry = super::MetricsRegistry::new().expect("registry");
		let output = registry.encode().expect("encode");
		assert!(output.contains("tweet_ingest_posts_fetched_total"));
		assert!(output.contains("tweet_ingest_search_duration_seconds_bucket"));
	}

	#[test]
	fn metrics_increment() {
		let registry = super::MetricsRegistry::new().expect("registry");
		registry.posts_fetched_total.inc_by(3);
		registry.record_outcome(true);
		let output = registry.encode().expect("encode");
		assert!(output.contains("tweet_ingest_posts_fetched_total 3"));
		assert!(output.contains("tweet_ingest_last_run_success 1"));
	}
}
