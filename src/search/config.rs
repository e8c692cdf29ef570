use std::time::Duration;

use url::Url;

use crate::config::Settings;

/// Transport settings for the search API client.
///
/// Mirrors the knobs a typical API client exposes: where to send requests,
/// how long to wait, and how to behave on transient failures and rate limits.
#[derive(Debug, Clone)]
pub struct SearchApiConfig {
	/// Base URL for the API, e.g. `https://api.twitter.com/1.1`
	pub base_url: Url,

	/// Request timeout in milliseconds
	pub timeout_ms: u64,

	/// Maximum retries for 5xx/408 responses and connection failures
	pub max_retries: u32,

	/// Delay between retries in milliseconds
	pub retry_delay_ms: u64,

	/// Sleep until the rate-limit window resets instead of failing on 429
	pub wait_on_rate_limit: bool,

	/// Largest `count` the search endpoint accepts
	pub max_count_cap: u32,
}

impl Default for SearchApiConfig {
	fn default() -> Self {
		Self::from(&Settings::default())
	}
}

impl From<&Settings> for SearchApiConfig {
	fn from(settings: &Settings) -> Self {
		Self {
			base_url: settings.search_api_url.clone(),
			timeout_ms: settings.request_timeout_ms,
			max_retries: settings.max_retries,
			retry_delay_ms: settings.retry_delay_ms,
			wait_on_rate_limit: settings.wait_on_rate_limit,
			max_count_cap: settings.max_count_cap,
		}
	}
}

impl SearchApiConfig {
	/// Get the timeout as a Duration
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}

	/// Get the retry delay as a Duration
	pub fn retry_delay(&self) -> Duration {
		Duration::from_millis(self.retry_delay_ms)
	}

	/// Absolute URL of an endpoint below the base URL, without query string.
	pub fn endpoint(&self, path: &str) -> String {
		format!(
			"{}/{}",
			self.base_url.as_str().trim_end_matches('/'),
			path.trim_start_matches('/')
		)
	}
}
