use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Result-type filter understood by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
	/// Both popular and real-time results
	Mixed,
	/// Most recent results only
	Recent,
	/// Most popular results only
	Popular,
}

impl ResultType {
	pub fn as_str(&self) -> &'static str {
		match self {
			ResultType::Mixed => "mixed",
			ResultType::Recent => "recent",
			ResultType::Popular => "popular",
		}
	}
}

impl fmt::Display for ResultType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ResultType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"mixed" => Ok(ResultType::Mixed),
			"recent" => Ok(ResultType::Recent),
			"popular" => Ok(ResultType::Popular),
			other => Err(format!("unknown result type '{}'", other)),
		}
	}
}

/// One bounded keyword search. Built once per run from CLI input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
	pub search_word: String,
	/// ISO language code; `None` searches every language
	pub language: Option<String>,
	pub result_type: ResultType,
	pub max_count: u32,
}

impl SearchQuery {
	/// Query parameters for the search endpoint, with `count` clamped to `cap`.
	pub fn params(&self, cap: u32) -> Vec<(&'static str, String)> {
		let mut params = vec![("q", self.search_word.clone())];
		if let Some(lang) = self.language.as_deref().filter(|l| !l.is_empty()) {
			params.push(("lang", lang.to_string()));
		}
		params.push(("result_type", self.result_type.as_str().to_string()));
		params.push(("count", self.max_count.min(cap).to_string()));
		params
	}
}

#[cfg(test)]
#[cfg(feature = "unit-tests")]
mod tests {
	use super::*;

	fn query(language: Option<&str>, max_count: u32) -> SearchQuery {
		SearchQuery {
			search_word: "#insee".to_string(),
			language: language.map(str::to_string),
			result_type: ResultType::Mixed,
			max_count,
		}
	}

	#[test]
	fn params_include_language_when_set() {
		let params = query(Some("fr"), 5).params(100);
		assert_eq!(
			params,
			vec![
				("q", "#insee".to_string()),
				("lang", "fr".to_string()),
				("result_type", "mixed".to_string()),
				("count", "5".to_string()),
			]
		);
	}

	#[test]
	fn params_omit_missing_language() {
		let params = query(None, 5).params(100);
		assert!(params.iter().all(|(k, _)| *k != "lang"));
	}

	#[test]
	fn count_is_clamped_to_cap() {
		let params = query(None, 1_000_000).params(100);
		assert!(params.contains(&("count", "100".to_string())));
	}

	#[test]
	fn result_type_parses_case_insensitively() {
		assert_eq!("Recent".parse::<ResultType>(), Ok(ResultType::Recent));
		assert_eq!("popular".parse::<ResultType>(), Ok(ResultType::Popular));
		assert!("latest".parse::<ResultType>().is_err());
	}
}
