use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;

use super::config::SearchApiConfig;
use super::oauth::{self, OAuthSigner};
use super::query::SearchQuery;
use super::results::{RawPost, SearchResults};
use crate::credentials::SearchCredentials;

const VERIFY_CREDENTIALS: &str = "account/verify_credentials.json";
const SEARCH_TWEETS: &str = "search/tweets.json";

/// Errors raised while talking to the search API.
#[derive(Debug, Error)]
pub enum SearchError {
	#[error("authentication rejected by the search API ({status}): {body}")]
	Authentication { status: StatusCode, body: String },

	#[error("search API returned {status}: {body}")]
	Status { status: StatusCode, body: String },

	#[error("HTTP request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("invalid JSON from the search API: {0}")]
	Decode(#[from] serde_json::Error),

	#[error("unexpected search payload: {0}")]
	UnexpectedPayload(String),

	#[error("max retries exceeded after {attempts} attempts: {last}")]
	RetriesExhausted { attempts: u32, last: String },

	#[error("request signing failed: {0}")]
	Signing(#[from] hmac::digest::InvalidLength),
}

/// Anything that can answer a [`SearchQuery`] with raw posts.
#[async_trait]
pub trait PostSource {
	async fn search(&self, query: &SearchQuery) -> Result<SearchResults, SearchError>;
}

/// Authenticated session against the Twitter v1.1 REST API.
///
/// Requests are signed with OAuth 1.0a user context. Rate-limited responses
/// (429) put the client to sleep until the window resets; 5xx/408 responses and
/// connection failures are retried a bounded number of times.
pub struct TwitterClient {
	http: reqwest::Client,
	config: SearchApiConfig,
	signer: OAuthSigner,
	account: Option<String>,
}

impl TwitterClient {
	/// Build a client and verify the credentials with one round trip.
	pub async fn connect(
		credentials: SearchCredentials,
		config: SearchApiConfig,
	) -> Result<Self, SearchError> {
		let http = reqwest::Client::builder()
			.timeout(config.timeout())
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.build()?;

		let mut client = Self {
			http,
			config,
			signer: OAuthSigner::new(credentials),
			account: None,
		};

		let params = [
			("include_entities", "false".to_string()),
			("skip_status", "true".to_string()),
		];
		let profile = match client.get_json(VERIFY_CREDENTIALS, &params).await {
			Ok(profile) => profile,
			Err(SearchError::Status { status, body })
				if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
			{
				warn!("Error during authentication: {}", status);
				return Err(SearchError::Authentication { status, body });
			}
			Err(e) => {
				warn!("Error during authentication: {}", e);
				return Err(e);
			}
		};

		client.account = profile
			.get("screen_name")
			.and_then(Value::as_str)
			.map(str::to_string);
		info!("Authentication OK");
		Ok(client)
	}

	/// Screen name of the authenticated account, when the API reported one.
	pub fn account(&self) -> Option<&str> {
		self.account.as_deref()
	}

	/// Signed GET with rate-limit waiting and bounded retries.
	async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, SearchError> {
		let url = self.config.endpoint(path);
		let query = params
			.iter()
			.map(|(k, v)| format!("{}={}", oauth::encode(k), oauth::encode(v)))
			.collect::<Vec<_>>()
			.join("&");
		let request_url = if query.is_empty() {
			url.clone()
		} else {
			format!("{}?{}", url, query)
		};

		let mut attempts = 0;
		loop {
			// Nonce and timestamp must be fresh on every attempt
			let header = self.signer.authorization_header("GET", &url, params)?;
			let sent = self
				.http
				.get(&request_url)
				.header(AUTHORIZATION, header)
				.send()
				.await;

			let response = match sent {
				Ok(response) => response,
				Err(e) if is_transient(&e) => {
					if attempts >= self.config.max_retries {
						return Err(SearchError::RetriesExhausted {
							attempts: attempts + 1,
							last: e.to_string(),
						});
					}
					attempts += 1;
					self.pause_before_retry(path, attempts, &e.to_string()).await;
					continue;
				}
				Err(e) => return Err(e.into()),
			};

			let status = response.status();
			if status.is_success() {
				let body = response.bytes().await?;
				return Ok(serde_json::from_slice(&body)?);
			}

			if status == StatusCode::TOO_MANY_REQUESTS && self.config.wait_on_rate_limit {
				if let Some(wait) = rate_limit_wait(response.headers(), unix_now()) {
					warn!("Rate limit reached on {}, sleeping for {:?}", path, wait);
					sleep(wait).await;
					continue;
				}
				// No usable reset time: plain retry, bounded like any other
				if attempts >= self.config.max_retries {
					return Err(SearchError::RetriesExhausted {
						attempts: attempts + 1,
						last: status.to_string(),
					});
				}
				attempts += 1;
				self.pause_before_retry(path, attempts, status.as_str()).await;
				continue;
			}

			let body = response.text().await.unwrap_or_default();
			if is_retryable_status(status) {
				if attempts >= self.config.max_retries {
					return Err(SearchError::RetriesExhausted {
						attempts: attempts + 1,
						last: format!("{}: {}", status, body),
					});
				}
				attempts += 1;
				self.pause_before_retry(path, attempts, status.as_str()).await;
				continue;
			}

			return Err(SearchError::Status { status, body });
		}
	}

	async fn pause_before_retry(&self, path: &str, attempt: u32, cause: &str) {
		let delay = self.config.retry_delay();
		warn!(
			"Request to {} failed (attempt {}/{}): {}, retrying after {:?}",
			path, attempt, self.config.max_retries, cause, delay
		);
		sleep(delay).await;
	}
}

#[async_trait]
impl PostSource for TwitterClient {
	async fn search(&self, query: &SearchQuery) -> Result<SearchResults, SearchError> {
		let cap = self.config.max_count_cap;
		if query.max_count > cap {
			warn!(
				"Requested {} posts; the search API returns at most {} per request",
				query.max_count, cap
			);
		}

		let body = self.get_json(SEARCH_TWEETS, &query.params(cap)).await?;
		let statuses = match body {
			Value::Object(mut map) => map.remove("statuses"),
			_ => None,
		};

		match statuses {
			Some(Value::Array(items)) => {
				debug!("search for {:?} returned {} posts", query.search_word, items.len());
				Ok(SearchResults::new(items.into_iter().map(RawPost::from).collect()))
			}
			_ => Err(SearchError::UnexpectedPayload(
				"response has no `statuses` array".to_string(),
			)),
		}
	}
}

fn is_transient(error: &reqwest::Error) -> bool {
	error.is_timeout() || error.is_connect()
}

fn is_retryable_status(status: StatusCode) -> bool {
	status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT
}

fn unix_now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or_default()
}

/// Time to sleep after a 429: until `x-rate-limit-reset` plus one second.
/// `None` when the header is absent, malformed or already in the past.
fn rate_limit_wait(headers: &HeaderMap, now: u64) -> Option<Duration> {
	headers
		.get("x-rate-limit-reset")
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.trim().parse::<u64>().ok())
		.filter(|reset| *reset > now)
		.map(|reset| Duration::from_secs(reset - now + 1))
}
