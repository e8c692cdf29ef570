//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha1::Sha1;

use crate::credentials::SearchCredentials;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay as-is; everything else is escaped.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'.')
	.remove(b'_')
	.remove(b'~');

pub fn encode(s: &str) -> String {
	utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// Signs requests with a consumer key pair and an access token pair.
#[derive(Clone)]
pub struct OAuthSigner {
	credentials: SearchCredentials,
}

impl OAuthSigner {
	pub fn new(credentials: SearchCredentials) -> Self {
		Self { credentials }
	}

	/// Build the `Authorization` header for a request with a fresh nonce and
	/// timestamp. `params` are the query (or form) parameters of the request.
	pub fn authorization_header(
		&self,
		method: &str,
		url: &str,
		params: &[(&str, String)],
	) -> Result<String, hmac::digest::InvalidLength> {
		let nonce: String = rand::thread_rng()
			.sample_iter(&Alphanumeric)
			.take(32)
			.map(char::from)
			.collect();
		let timestamp = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs())
			.unwrap_or_default();
		self.authorization_header_with(method, url, params, &nonce, timestamp)
	}

	/// Deterministic variant of [`Self::authorization_header`].
	pub fn authorization_header_with(
		&self,
		method: &str,
		url: &str,
		params: &[(&str, String)],
		nonce: &str,
		timestamp: u64,
	) -> Result<String, hmac::digest::InvalidLength> {
		let mut oauth_params = vec![
			("oauth_consumer_key", self.credentials.consumer_key.clone()),
			("oauth_nonce", nonce.to_string()),
			("oauth_signature_method", "HMAC-SHA1".to_string()),
			("oauth_timestamp", timestamp.to_string()),
			("oauth_token", self.credentials.access_token.clone()),
			("oauth_version", "1.0".to_string()),
		];

		let signature = self.signature(method, url, params, &oauth_params)?;
		oauth_params.push(("oauth_signature", signature));
		oauth_params.sort_by(|a, b| a.0.cmp(b.0));

		let fields: Vec<String> = oauth_params
			.iter()
			.map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
			.collect();
		Ok(format!("OAuth {}", fields.join(", ")))
	}

	fn signature(
		&self,
		method: &str,
		url: &str,
		params: &[(&str, String)],
		oauth_params: &[(&str, String)],
	) -> Result<String, hmac::digest::InvalidLength> {
		let mut encoded: Vec<(String, String)> = params
			.iter()
			.chain(oauth_params.iter())
			.map(|(k, v)| (encode(k), encode(v)))
			.collect();
		encoded.sort();

		let parameter_string = encoded
			.iter()
			.map(|(k, v)| format!("{}={}", k, v))
			.collect::<Vec<_>>()
			.join("&");

		let base_string = format!(
			"{}&{}&{}",
			method.to_ascii_uppercase(),
			encode(url),
			encode(&parameter_string)
		);
		let signing_key = format!(
			"{}&{}",
			encode(&self.credentials.consumer_secret),
			encode(&self.credentials.access_token_secret)
		);

		let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())?;
		mac.update(base_string.as_bytes());
		Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
	}
}
