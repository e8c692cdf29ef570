use std::fmt;

use chrono::NaiveDate;
use object_store::path::Path;

/// Bucket plus object key of a stored table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
	bucket: String,
	path: String,
}

impl StorageLocation {
	pub fn new(bucket: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			bucket: bucket.into(),
			path: path.into(),
		}
	}

	/// `{output_path}/tweet_{DD-MM-YYYY}` for the given day.
	///
	/// Empty and `.` segments of `output_path` are dropped; anything else the
	/// object store would refuse (such as `..`) is an error here, before any
	/// request is made.
	pub fn dated(
		bucket: impl Into<String>,
		output_path: &str,
		date: NaiveDate,
	) -> Result<Self, object_store::path::Error> {
		let file = format!("tweet_{}", date.format("%d-%m-%Y"));
		let path = output_path
			.split('/')
			.filter(|segment| !segment.is_empty() && *segment != ".")
			.chain(std::iter::once(file.as_str()))
			.collect::<Vec<_>>()
			.join("/");

		let location = Self::new(bucket, path);
		location.object_path()?;
		Ok(location)
	}

	pub fn bucket(&self) -> &str {
		&self.bucket
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	pub fn object_path(&self) -> Result<Path, object_store::path::Error> {
		Path::parse(&self.path)
	}
}

impl fmt::Display for StorageLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "s3://{}/{}", self.bucket, self.path.trim_start_matches('/'))
	}
}
