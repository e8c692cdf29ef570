use log::Level;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::search::ResultType;

/// Runtime configuration for tweet-ingest.
///
/// Values are loaded from (in order): `/etc/tweet-ingest/config.json`, the same
/// file under the user config folders (all optional), and environment variables
/// prefixed with `TWI_` (e.g. `TWI_DEFAULT_MAX_COUNT`). Credentials are never
/// read from here; see [`crate::credentials`].
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct Settings {
	/// Result type used when `-r` is omitted
	pub default_result_type: ResultType,
	/// Post count used when `-m` is omitted
	pub default_max_count: u32,
	/// Upper bound for the per-request count accepted by the search API
	pub max_count_cap: u32,
	pub search_api_url: Url,
	pub request_timeout_ms: u64,
	// Transient-failure retries; rate-limit waits do not consume these
	pub max_retries: u32,
	pub retry_delay_ms: u64,
	pub wait_on_rate_limit: bool,
	pub store_region: String,
	/// Rows of the read-back table printed to the console
	pub preview_rows: usize,
	pub log_level: Level,
	/// Optional Prometheus textfile written at the end of a run
	pub metrics_textfile: Option<String>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			default_result_type: ResultType::Mixed,
			default_max_count: 100,
			max_count_cap: 100,
			search_api_url: Url::parse("https://api.twitter.com/1.1").expect("static URL is valid"),
			request_timeout_ms: 30_000,
			max_retries: 5,
			retry_delay_ms: 1_000,
			wait_on_rate_limit: true,
			store_region: "us-east-1".to_string(),
			preview_rows: 5,
			log_level: Level::Info,
			metrics_textfile: None,
		}
	}
}

#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("configuration error: {0}")]
	Config(#[from] config::ConfigError),

	#[error("invalid setting {field}: {reason}")]
	Invalid {
		field: &'static str,
		reason: &'static str,
	},
}

impl Settings {
	/// Reject values the search step cannot use.
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.default_max_count == 0 {
			return Err(SettingsError::Invalid {
				field: "default_max_count",
				reason: "must be at least 1",
			});
		}
		if self.max_count_cap == 0 {
			return Err(SettingsError::Invalid {
				field: "max_count_cap",
				reason: "must be at least 1",
			});
		}
		Ok(())
	}
}

pub fn load() -> Result<Settings, SettingsError> {
	let mut builder = config::Config::builder()
		.add_source(config::File::with_name("/etc/tweet-ingest/config.json").required(false));

	if let Some(folder) = dirs::config_dir() {
		let user_config_path = folder.join("tweet-ingest").join("config.json");
		builder = builder.add_source(config::File::from(user_config_path).required(false));
	}
	if let Some(folder) = dirs::config_local_dir() {
		let local_config_path = folder.join("tweet-ingest").join("config.json");
		builder = builder.add_source(config::File::from(local_config_path).required(false));
	}

	builder = builder.add_source(config::Environment::with_prefix("TWI").separator("__"));

	let cfg = builder.build()?;

	let mut s: Settings = cfg.try_deserialize()?;

	// Direct environment variables win over whatever the `config` crate mapped;
	// some harnesses set them in ways the prefix mapping does not pick up.
	if let Ok(r) = std::env::var("TWI_DEFAULT_RESULT_TYPE") {
		if let Ok(parsed) = r.parse::<ResultType>() {
			s.default_result_type = parsed;
		}
	}
	if let Ok(m) = std::env::var("TWI_DEFAULT_MAX_COUNT") {
		if let Ok(parsed) = m.parse::<u32>() {
			if parsed > 0 {
				s.default_max_count = parsed;
			}
		}
	}
	if let Ok(u) = std::env::var("TWI_SEARCH_API_URL") {
		if !u.is_empty() {
			if let Ok(parsed) = Url::parse(&u) {
				s.search_api_url = parsed;
			}
		}
	}
	if let Ok(r) = std::env::var("TWI_STORE_REGION") {
		if !r.is_empty() {
			s.store_region = r;
		}
	}
	if let Ok(p) = std::env::var("TWI_METRICS_TEXTFILE") {
		if !p.is_empty() {
			s.metrics_textfile = Some(p);
		}
	}
	if let Ok(l) = std::env::var("TWI_LOG_LEVEL") {
		if !l.is_empty() {
			if let Ok(parsed) = l.parse::<Level>() {
				s.log_level = parsed;
			}
		}
	}

	s.validate()?;
	Ok(s)
}
