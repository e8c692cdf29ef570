use clap::Parser;

use crate::config::Settings;
use crate::search::{ResultType, SearchQuery};

/// Command-line arguments for one ingestion run.
#[derive(Debug, Clone, Parser)]
#[command(
	name = "tweet-ingest",
	version,
	about = "Fetch posts matching a search word and store them as Parquet in an S3 bucket",
	after_help = "The allowed values for result_type are {mixed, recent, popular}.\n\
		If -r or -m is missing, the default from the configuration is used.\n\
		Credentials are read from TWITTER_CONSUMER_KEY, TWITTER_CONSUMER_SECRET,\n\
		TWITTER_ACCESS_TOKEN, TWITTER_ACCESS_TOKEN_SECRET, AWS_S3_ENDPOINT,\n\
		AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY and AWS_SESSION_TOKEN."
)]
pub struct Cli {
	/// Word, hashtag or search expression to look for
	#[arg(short = 's', long = "search_word", visible_alias = "search-word")]
	pub search_word: String,

	/// Restrict results to this ISO language code (e.g. fr)
	#[arg(short = 'l', long = "language")]
	pub language: Option<String>,

	/// Which results to prefer
	#[arg(short = 'r', long = "result_type", visible_alias = "result-type", value_enum)]
	pub result_type: Option<ResultType>,

	/// Maximum number of posts to fetch
	#[arg(
		short = 'm',
		long = "max_tweet_count",
		visible_alias = "max-tweet-count",
		value_parser = clap::value_parser!(u32).range(1..)
	)]
	pub max_tweet_count: Option<u32>,

	/// Destination bucket
	#[arg(short = 'b', long = "bucket_name", visible_alias = "bucket-name")]
	pub bucket_name: String,

	/// Directory (key prefix) inside the bucket
	#[arg(short = 'o', long = "output_path", visible_alias = "output-path")]
	pub output_path: String,
}

impl Cli {
	/// Build the search query, filling omitted options from `settings`.
	pub fn query(&self, settings: &Settings) -> SearchQuery {
		SearchQuery {
			search_word: self.search_word.clone(),
			language: self.language.clone(),
			result_type: self.result_type.unwrap_or(settings.default_result_type),
			max_count: self.max_tweet_count.unwrap_or(settings.default_max_count),
		}
	}
}
