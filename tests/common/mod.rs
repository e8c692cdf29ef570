/// Common test fixtures and helpers for integration tests.
use std::env;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use tweet_ingest::search::{PostSource, RawPost, SearchError, SearchQuery, SearchResults};

/// Check if live integration tests are enabled via environment variable.
/// Returns true if RUN_LIVE_INTEGRATION_TESTS is set.
#[allow(dead_code)]
pub fn is_live_test_enabled() -> bool {
	env::var("RUN_LIVE_INTEGRATION_TESTS").is_ok()
}

/// Skip the test with a message if live integration tests are not enabled.
/// Returns true if the test should proceed, false if it should be skipped.
#[allow(dead_code)]
pub fn check_live_enabled() -> bool {
	if !is_live_test_enabled() {
		eprintln!(
			"Skipping live integration test; set RUN_LIVE_INTEGRATION_TESTS=1 and the credential variables to enable"
		);
		return false;
	}
	true
}

/// Three posts shaped like v1.1 search results, newest last.
#[allow(dead_code)]
pub fn insee_statuses() -> Vec<Value> {
	vec![
		json!({
			"created_at": "Mon Nov 29 08:15:02 +0000 2021",
			"id": 1465224938390048769u64,
			"id_str": "1465224938390048769",
			"text": "Le #PIB progresse de 3,0 % au troisième trimestre 2021 #insee",
			"truncated": false,
			"lang": "fr",
			"user": {"id": 174146245, "name": "Insee", "screen_name": "InseeFr"},
			"retweet_count": 41,
			"favorite_count": 57
		}),
		json!({
			"created_at": "Mon Nov 29 09:40:11 +0000 2021",
			"id": 1465246367911432193u64,
			"text": "Nouvelle publication sur l'emploi salarié #insee",
			"lang": "fr",
			"user": {"id": 99, "name": "Dares", "screen_name": "Dares_travail"},
			"entities": {"hashtags": [{"text": "insee"}]}
		}),
		json!({
			"created_at": "Mon Nov 29 10:02:47 +0000 2021",
			"id": 1465252054263545858u64,
			"text": "RT @InseeFr: chiffres clés #insee",
			"lang": "fr",
			"user": {"id": 7, "screen_name": "anonymous"}
		}),
	]
}

/// In-process post source that records the query it was asked.
#[allow(dead_code)]
pub struct StubSource {
	posts: Vec<Value>,
	pub last_query: Mutex<Option<SearchQuery>>,
}

#[allow(dead_code)]
impl StubSource {
	pub fn new(posts: Vec<Value>) -> Self {
		Self {
			posts,
			last_query: Mutex::new(None),
		}
	}
}

#[async_trait]
impl PostSource for StubSource {
	async fn search(&self, query: &SearchQuery) -> Result<SearchResults, SearchError> {
		*self.last_query.lock().unwrap() = Some(query.clone());
		let take = query.max_count as usize;
		Ok(SearchResults::new(
			self.posts
				.iter()
				.take(take)
				.cloned()
				.map(RawPost::from)
				.collect(),
		))
	}
}
