//! Opaque service credentials read from the process environment.
//!
//! Both credential sets are loaded before any network call so a missing
//! variable stops the run early. Secrets are never printed: the `Debug`
//! impls below redact them.

use std::fmt;

use thiserror::Error;

/// Environment variables holding the search API credentials.
pub const SEARCH_ENV_VARS: [&str; 4] = [
	"TWITTER_CONSUMER_KEY",
	"TWITTER_CONSUMER_SECRET",
	"TWITTER_ACCESS_TOKEN",
	"TWITTER_ACCESS_TOKEN_SECRET",
];

/// Environment variables holding the object store credentials.
pub const STORE_ENV_VARS: [&str; 4] = [
	"AWS_S3_ENDPOINT",
	"AWS_ACCESS_KEY_ID",
	"AWS_SECRET_ACCESS_KEY",
	"AWS_SESSION_TOKEN",
];

const REDACTED: &str = "***";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("incomplete {service} credentials: missing {}", .missing.join(", "))]
pub struct CredentialError {
	pub service: &'static str,
	pub missing: Vec<&'static str>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct SearchCredentials {
	pub consumer_key: String,
	pub consumer_secret: String,
	pub access_token: String,
	pub access_token_secret: String,
}

impl SearchCredentials {
	pub fn from_env() -> Result<Self, CredentialError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let [consumer_key, consumer_secret, access_token, access_token_secret] =
			read_all("search API", SEARCH_ENV_VARS, lookup)?;
		Ok(Self {
			consumer_key,
			consumer_secret,
			access_token,
			access_token_secret,
		})
	}
}

impl fmt::Debug for SearchCredentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SearchCredentials")
			.field("consumer_key", &REDACTED)
			.field("consumer_secret", &REDACTED)
			.field("access_token", &REDACTED)
			.field("access_token_secret", &REDACTED)
			.finish()
	}
}

#[derive(Clone, PartialEq, Eq)]
pub struct StoreCredentials {
	pub endpoint: String,
	pub access_key_id: String,
	pub secret_access_key: String,
	pub session_token: String,
}

impl StoreCredentials {
	pub fn from_env() -> Result<Self, CredentialError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let [endpoint, access_key_id, secret_access_key, session_token] =
			read_all("object store", STORE_ENV_VARS, lookup)?;
		Ok(Self {
			endpoint,
			access_key_id,
			secret_access_key,
			session_token,
		})
	}
}

impl fmt::Debug for StoreCredentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StoreCredentials")
			.field("endpoint", &self.endpoint)
			.field("access_key_id", &REDACTED)
			.field("secret_access_key", &REDACTED)
			.field("session_token", &REDACTED)
			.finish()
	}
}

/// Read every variable in `names`; empty values count as missing.
fn read_all<F, const N: usize>(
	service: &'static str,
	names: [&'static str; N],
	lookup: F,
) -> Result<[String; N], CredentialError>
where
	F: Fn(&str) -> Option<String>,
{
	let values = names.map(|name| lookup(name).filter(|v| !v.is_empty()));
	let missing: Vec<&'static str> = names
		.iter()
		.zip(values.iter())
		.filter(|(_, v)| v.is_none())
		.map(|(name, _)| *name)
		.collect();

	if !missing.is_empty() {
		return Err(CredentialError { service, missing });
	}
	Ok(values.map(Option::unwrap_or_default))
}

#[cfg(test)]
#[cfg(feature = "unit-tests")]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn loads_complete_search_credentials() {
		let env = env_map(&[
			("TWITTER_CONSUMER_KEY", "ck"),
			("TWITTER_CONSUMER_SECRET", "cs"),
			("TWITTER_ACCESS_TOKEN", "at"),
			("TWITTER_ACCESS_TOKEN_SECRET", "ats"),
		]);
		let creds = SearchCredentials::from_lookup(|k| env.get(k).cloned()).expect("complete");
		assert_eq!(creds.consumer_key, "ck");
		assert_eq!(creds.access_token_secret, "ats");
	}

	#[test]
	fn reports_every_missing_variable() {
		let env = env_map(&[
			("TWITTER_CONSUMER_KEY", "ck"),
			("TWITTER_ACCESS_TOKEN", ""),
		]);
		let err = SearchCredentials::from_lookup(|k| env.get(k).cloned()).unwrap_err();
		assert_eq!(err.service, "search API");
		assert_eq!(
			err.missing,
			vec![
				"TWITTER_CONSUMER_SECRET",
				"TWITTER_ACCESS_TOKEN",
				"TWITTER_ACCESS_TOKEN_SECRET"
			]
		);
		assert!(err.to_string().contains("TWITTER_CONSUMER_SECRET"));
	}

	#[test]
	fn store_credentials_debug_hides_secrets() {
		let env = env_map(&[
			("AWS_S3_ENDPOINT", "https://minio.example.org"),
			("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
			("AWS_SECRET_ACCESS_KEY", "wJalrXUtnFEMI"),
			("AWS_SESSION_TOKEN", "FwoGZXIvYXdzEXAMPLE"),
		]);
		let creds = StoreCredentials::from_lookup(|k| env.get(k).cloned()).expect("complete");
		let printed = format!("{:?}", creds);
		assert!(printed.contains("minio.example.org"));
		assert!(!printed.contains("AKIDEXAMPLE"));
		assert!(!printed.contains("wJalrXUtnFEMI"));
		assert!(!printed.contains("FwoGZXIvYXdzEXAMPLE"));
	}

	#[test]
	fn missing_store_credentials_fail() {
		let err = StoreCredentials::from_lookup(|_| None).unwrap_err();
		assert_eq!(err.missing.len(), 4);
	}
}
