use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ObjectStoreResult;

/// The GCS-style object domain this system talks to: two logical buckets
/// (hi-res input, lo-res output), objects keyed by filename, with an
/// optional filesystem mount exposing the same objects as paths for
/// processes that can't speak the storage SDK directly (the transcoder).
#[async_trait]
pub trait ObjectStore: Send + Sync {
	async fn check_connectivity(&self) -> ObjectStoreResult<()>;

	async fn get_object(&self, bucket: &str, name: &str) -> ObjectStoreResult<Vec<u8>>;

	async fn put_object(
		&self,
		bucket: &str,
		name: &str,
		bytes: Vec<u8>,
		mime_type: &str,
	) -> ObjectStoreResult<()>;

	/// Streams an object's bytes directly to a local path, for steps (like
	/// the transcoder) that need a real file rather than an in-memory buffer.
	async fn copy_to_path(&self, bucket: &str, name: &str, dest: &Path) -> ObjectStoreResult<u64>;

	async fn object_num_bytes(&self, bucket: &str, name: &str) -> ObjectStoreResult<u64>;

	/// The direct, SDK-style URL a persisted Media's `media_url` is built
	/// from. Reconstructed from bucket+name, never fetched from the backend.
	fn object_url(&self, bucket: &str, name: &str) -> String;

	/// The path an object would have under the configured filesystem mount,
	/// if one is configured. Callers that can use direct SDK I/O should
	/// prefer `get_object`/`copy_to_path`; this exists for the transcoder,
	/// which shells out to an external process that needs a real path.
	fn mounted_path(&self, bucket: &str, name: &str) -> Option<PathBuf>;
}

pub(crate) fn gcs_style_url(bucket: &str, name: &str) -> String {
	format!("https://storage.mtls.cloud.google.com/{bucket}/{name}")
}
