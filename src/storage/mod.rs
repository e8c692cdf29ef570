pub mod codec;
pub mod gateway;
pub mod location;

pub use codec::CodecError;
pub use gateway::{
	BucketProvider, MemoryBuckets, S3Buckets, StorageReadError, StorageWriteError, StoreSession,
	WriteReceipt,
};
pub use location::StorageLocation;
