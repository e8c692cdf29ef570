//! Parquet encoding of [`PostTable`].

use arrow::error::ArrowError;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use thiserror::Error;

use crate::ingest::{COLUMNS, PostTable};

#[derive(Debug, Error)]
pub enum CodecError {
	#[error("parquet error: {0}")]
	Parquet(#[from] ParquetError),

	#[error("arrow error: {0}")]
	Arrow(#[from] ArrowError),

	#[error("stored table is missing column '{0}'")]
	MissingColumn(&'static str),
}

/// Encode a table as a single-row-group, snappy-compressed Parquet file.
pub fn encode(table: &PostTable) -> Result<Vec<u8>, CodecError> {
	let batch = table.to_record_batch()?;
	let props = WriterProperties::builder()
		.set_compression(Compression::SNAPPY)
		.build();

	let mut buf = Vec::new();
	let mut writer = ArrowWriter::try_new(&mut buf, PostTable::schema(), Some(props))?;
	writer.write(&batch)?;
	writer.close()?;
	Ok(buf)
}

/// Decode a Parquet file written by [`encode`] (or any file carrying the
/// three utf8 columns). Extra columns are ignored.
pub fn decode(data: Bytes) -> Result<PostTable, CodecError> {
	let builder = ParquetRecordBatchReaderBuilder::try_new(data)?;
	let schema = builder.schema().clone();
	if let Some(missing) = COLUMNS.iter().find(|c| schema.field_with_name(c).is_err()) {
		return Err(CodecError::MissingColumn(*missing));
	}

	let mut table = PostTable::default();
	for batch in builder.build()? {
		table.extend_from_batch(&batch?)?;
	}
	Ok(table)
}

#[cfg(test)]
#[cfg(feature = "unit-tests")]
mod tests {
	use super::*;
	use crate::ingest::PostRecord;

	#[test]
	fn empty_table_decodes_with_schema() {
		let bytes = encode(&PostTable::default()).expect("encode");
		assert!(!bytes.is_empty());

		let back = decode(Bytes::from(bytes)).expect("decode");
		assert!(back.is_empty());
		assert_eq!(back.columns(), COLUMNS);
	}

	#[test]
	fn decode_preserves_order_and_nulls() {
		let table = PostTable::new(vec![
			PostRecord {
				author_name: Some("Insee".to_string()),
				created_at: Some("Mon Nov 29 10:00:00 +0000 2021".to_string()),
				text: Some("Le #PIB progresse de 3,0 %".to_string()),
			},
			PostRecord {
				author_name: None,
				created_at: None,
				text: Some("émoji ✅".to_string()),
			},
		]);

		let back = decode(Bytes::from(encode(&table).expect("encode"))).expect("decode");
		assert_eq!(back, table);
	}

	#[test]
	fn decode_rejects_garbage() {
		assert!(decode(Bytes::from_static(b"not a parquet file")).is_err());
	}
}
