use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use log::{debug, info};
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::{ObjectStore, PutPayload};
use thiserror::Error;
use url::Url;

use super::codec::{self, CodecError};
use super::location::StorageLocation;
use crate::credentials::StoreCredentials;
use crate::ingest::PostTable;

#[derive(Debug, Error)]
pub enum StorageWriteError {
	#[error("failed to encode table: {0}")]
	Codec(#[from] CodecError),

	#[error("invalid object path: {0}")]
	InvalidPath(#[from] object_store::path::Error),

	#[error("object store error: {0}")]
	Store(#[from] object_store::Error),
}

#[derive(Debug, Error)]
pub enum StorageReadError {
	#[error("no object at {location}")]
	NotFound { location: String },

	#[error("failed to decode table: {0}")]
	Codec(#[from] CodecError),

	#[error("invalid object path: {0}")]
	InvalidPath(#[from] object_store::path::Error),

	#[error("object store error: {0}")]
	Store(#[from] object_store::Error),
}

/// Hands out a store handle for a named bucket.
pub trait BucketProvider: Send + Sync {
	fn bucket(&self, name: &str) -> Result<Arc<dyn ObjectStore>, object_store::Error>;
}

/// S3-compatible buckets reached with static (session) credentials.
///
/// Building a handle does not touch the network; bad credentials or an
/// unreachable endpoint surface on the first request.
pub struct S3Buckets {
	credentials: StoreCredentials,
	region: String,
}

impl S3Buckets {
	pub fn new(credentials: StoreCredentials, region: impl Into<String>) -> Self {
		Self {
			credentials,
			region: region.into(),
		}
	}
}

impl BucketProvider for S3Buckets {
	fn bucket(&self, name: &str) -> Result<Arc<dyn ObjectStore>, object_store::Error> {
		let endpoint = endpoint_url(&self.credentials.endpoint)?;
		let store = AmazonS3Builder::new()
			.with_endpoint(endpoint.as_str().trim_end_matches('/'))
			.with_region(self.region.as_str())
			.with_bucket_name(name)
			.with_access_key_id(self.credentials.access_key_id.as_str())
			.with_secret_access_key(self.credentials.secret_access_key.as_str())
			.with_token(self.credentials.session_token.as_str())
			.with_virtual_hosted_style_request(false)
			.with_allow_http(endpoint.scheme() == "http")
			.build()?;
		Ok(Arc::new(store))
	}
}

/// Absolute endpoint URL. Host-only values (`minio.example.org`,
/// `10.0.0.5:9000`) get `https://`.
fn endpoint_url(raw: &str) -> Result<Url, object_store::Error> {
	let raw = raw.trim();
	let candidate = if raw.contains("://") {
		raw.to_string()
	} else {
		format!("https://{}", raw)
	};

	let url = Url::parse(&candidate).map_err(|e| invalid_endpoint(raw, e.to_string()))?;
	match url.scheme() {
		"http" | "https" => {}
		other => return Err(invalid_endpoint(raw, format!("unsupported scheme '{}'", other))),
	}
	if url.host_str().is_none_or(str::is_empty) {
		return Err(invalid_endpoint(raw, "no host".to_string()));
	}
	Ok(url)
}

fn invalid_endpoint(raw: &str, reason: String) -> object_store::Error {
	object_store::Error::Generic {
		store: "S3",
		source: format!("invalid endpoint '{}': {}", raw, reason).into(),
	}
}

/// Process-local buckets, created on first use.
#[derive(Default)]
pub struct MemoryBuckets {
	buckets: Mutex<HashMap<String, Arc<InMemory>>>,
}

impl MemoryBuckets {
	pub fn new() -> Self {
		Self::default()
	}
}

impl BucketProvider for MemoryBuckets {
	fn bucket(&self, name: &str) -> Result<Arc<dyn ObjectStore>, object_store::Error> {
		let mut buckets = self.buckets.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
		let store = buckets
			.entry(name.to_string())
			.or_insert_with(|| Arc::new(InMemory::new()))
			.clone();
		Ok(store)
	}
}

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
	pub location: StorageLocation,
	pub bytes: usize,
	pub e_tag: Option<String>,
}

/// Session over an object store: writes tables as Parquet and reads them back.
pub struct StoreSession {
	buckets: Box<dyn BucketProvider>,
}

impl StoreSession {
	/// Session against the S3-compatible endpoint named in `credentials`.
	pub fn connect(credentials: StoreCredentials, region: &str) -> Self {
		info!("object store endpoint: {}", credentials.endpoint);
		Self::with_provider(S3Buckets::new(credentials, region))
	}

	pub fn with_provider(provider: impl BucketProvider + 'static) -> Self {
		Self {
			buckets: Box::new(provider),
		}
	}

	/// Encode `table` and upload it, replacing any object already at `location`.
	#[tracing::instrument(skip(self, table, location), fields(location = %location, rows = table.len()))]
	pub async fn write(
		&self,
		table: &PostTable,
		location: &StorageLocation,
	) -> Result<WriteReceipt, StorageWriteError> {
		let payload = codec::encode(table)?;
		let bytes = payload.len();
		let path = location.object_path()?;
		let store = self.buckets.bucket(location.bucket())?;

		let result = store.put(&path, PutPayload::from(payload)).await?;
		debug!("wrote {} bytes to {}", bytes, location);

		Ok(WriteReceipt {
			location: location.clone(),
			bytes,
			e_tag: result.e_tag,
		})
	}

	/// Download and decode the table stored at `location`.
	#[tracing::instrument(skip(self, location), fields(location = %location))]
	pub async fn read(&self, location: &StorageLocation) -> Result<PostTable, StorageReadError> {
		let path = location.object_path()?;
		let store = self.buckets.bucket(location.bucket())?;

		let object = match store.get(&path).await {
			Ok(object) => object,
			Err(object_store::Error::NotFound { .. }) => {
				return Err(StorageReadError::NotFound {
					location: location.to_string(),
				});
			}
			Err(e) => return Err(e.into()),
		};
		let data: Bytes = object.bytes().await?;
		debug!("read {} bytes from {}", data.len(), location);

		Ok(codec::decode(data)?)
	}
}
