pub mod client;
pub mod config;
pub mod oauth;
pub mod query;
pub mod results;

pub use client::{PostSource, SearchError, TwitterClient};
pub use config::SearchApiConfig;
pub use query::{ResultType, SearchQuery};
pub use results::{RawPost, SearchResults};
