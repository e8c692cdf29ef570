//! Batch ingestion of search-API posts into Parquet files on S3-compatible
//! object storage.
//!
//! A run searches once, projects the raw posts onto a fixed
//! `author_name, created_at, text` table, uploads it to
//! `{output_path}/tweet_{DD-MM-YYYY}` and reads it back as a check.

pub mod cli;
pub mod config;
pub mod credentials;
pub mod ingest;
pub mod observability;
pub mod pipeline;
pub mod search;
pub mod storage;

pub use cli::Cli;
pub use pipeline::{PipelineError, RunReport, execute, run};
