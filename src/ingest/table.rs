use std::sync::{Arc, LazyLock};

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use serde::Serialize;

pub const AUTHOR_NAME: &str = "author_name";
pub const CREATED_AT: &str = "created_at";
pub const TEXT: &str = "text";

/// Column names, in storage order.
pub const COLUMNS: [&str; 3] = [AUTHOR_NAME, CREATED_AT, TEXT];

static SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
	Arc::new(Schema::new(
		COLUMNS
			.iter()
			.map(|name| Field::new(*name, DataType::Utf8, true))
			.collect::<Vec<_>>(),
	))
});

/// One normalized post. `None` marks a field the source did not provide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostRecord {
	pub author_name: Option<String>,
	/// Provider's native timestamp string, never reparsed
	pub created_at: Option<String>,
	pub text: Option<String>,
}

impl PostRecord {
	pub fn missing_fields(&self) -> usize {
		[&self.author_name, &self.created_at, &self.text]
			.iter()
			.filter(|f| f.is_none())
			.count()
	}
}

/// Ordered rows with the fixed `author_name, created_at, text` schema.
///
/// The schema does not depend on the rows: an empty table still converts to
/// a three-column record batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostTable {
	rows: Vec<PostRecord>,
}

impl PostTable {
	pub fn new(rows: Vec<PostRecord>) -> Self {
		Self { rows }
	}

	pub fn schema() -> SchemaRef {
		SCHEMA.clone()
	}

	pub fn columns(&self) -> [&'static str; 3] {
		COLUMNS
	}

	pub fn rows(&self) -> &[PostRecord] {
		&self.rows
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	pub fn missing_cells(&self) -> usize {
		self.rows.iter().map(PostRecord::missing_fields).sum()
	}

	/// First `n` rows, like a dataframe `head`.
	pub fn head(&self, n: usize) -> PostTable {
		PostTable::new(self.rows.iter().take(n).cloned().collect())
	}

	pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
		let authors: StringArray = self.rows.iter().map(|r| r.author_name.as_deref()).collect();
		let created: StringArray = self.rows.iter().map(|r| r.created_at.as_deref()).collect();
		let texts: StringArray = self.rows.iter().map(|r| r.text.as_deref()).collect();
		RecordBatch::try_new(
			Self::schema(),
			vec![
				Arc::new(authors) as ArrayRef,
				Arc::new(created),
				Arc::new(texts),
			],
		)
	}

	/// Append the rows of `batch`, looking columns up by name.
	pub fn extend_from_batch(&mut self, batch: &RecordBatch) -> Result<(), ArrowError> {
		let [author, created, text] = COLUMNS.map(|name| string_column(batch, name));
		let (author, created, text) = (author?, created?, text?);

		self.rows.reserve(batch.num_rows());
		for i in 0..batch.num_rows() {
			self.rows.push(PostRecord {
				author_name: cell(author, i),
				created_at: cell(created, i),
				text: cell(text, i),
			});
		}
		Ok(())
	}

	/// ASCII rendering of the first `n` rows.
	pub fn preview(&self, n: usize) -> Result<String, ArrowError> {
		let batch = self.head(n).to_record_batch()?;
		Ok(pretty_format_batches(&[batch])?.to_string())
	}
}

impl FromIterator<PostRecord> for PostTable {
	fn from_iter<I: IntoIterator<Item = PostRecord>>(iter: I) -> Self {
		Self::new(iter.into_iter().collect())
	}
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, ArrowError> {
	batch
		.column_by_name(name)
		.ok_or_else(|| ArrowError::SchemaError(format!("missing column '{}'", name)))?
		.as_any()
		.downcast_ref::<StringArray>()
		.ok_or_else(|| ArrowError::SchemaError(format!("column '{}' is not utf8", name)))
}

fn cell(array: &StringArray, i: usize) -> Option<String> {
	if array.is_null(i) {
		None
	} else {
		Some(array.value(i).to_string())
	}
}
