use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::{
	error::ObjectStoreResult,
	store::{gcs_style_url, ObjectStore},
};

/// A local-directory-backed [`ObjectStore`], grounded on the same
/// folder-walking approach as a filesystem-mounted source: each configured
/// bucket is a subdirectory of `root`, objects are files keyed by name.
/// Used for local development and for exercising Steps without a live GCS
/// project.
#[derive(Clone)]
pub struct FilesystemObjectStore {
	root: PathBuf,
}

impl FilesystemObjectStore {
	pub fn new(root: PathBuf) -> Self {
		Self { root }
	}

	fn bucket_dir(&self, bucket: &str) -> PathBuf {
		self.root.join(bucket)
	}

	fn object_path(&self, bucket: &str, name: &str) -> PathBuf {
		self.bucket_dir(bucket).join(name)
	}
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
	async fn check_connectivity(&self) -> ObjectStoreResult<()> {
		if !self.root.exists() {
			return Err(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("object store root {} does not exist", self.root.display()),
			)
			.into());
		}
		Ok(())
	}

	async fn get_object(&self, bucket: &str, name: &str) -> ObjectStoreResult<Vec<u8>> {
		let bytes = tokio::fs::read(self.object_path(bucket, name)).await?;
		Ok(bytes)
	}

	async fn put_object(
		&self,
		bucket: &str,
		name: &str,
		bytes: Vec<u8>,
		_mime_type: &str,
	) -> ObjectStoreResult<()> {
		let dir = self.bucket_dir(bucket);
		tokio::fs::create_dir_all(&dir).await?;
		let mut file = tokio::fs::File::create(self.object_path(bucket, name)).await?;
		file.write_all(&bytes).await?;
		file.flush().await?;
		Ok(())
	}

	async fn copy_to_path(&self, bucket: &str, name: &str, dest: &Path) -> ObjectStoreResult<u64> {
		let bytes = tokio::fs::copy(self.object_path(bucket, name), dest).await?;
		Ok(bytes)
	}

	async fn object_num_bytes(&self, bucket: &str, name: &str) -> ObjectStoreResult<u64> {
		let meta = tokio::fs::metadata(self.object_path(bucket, name)).await?;
		Ok(meta.len())
	}

	fn object_url(&self, bucket: &str, name: &str) -> String {
		gcs_style_url(bucket, name)
	}

	fn mounted_path(&self, bucket: &str, name: &str) -> Option<PathBuf> {
		Some(self.object_path(bucket, name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn round_trips_an_object() {
		let dir = tempfile::tempdir().unwrap();
		let store = FilesystemObjectStore::new(dir.path().to_path_buf());
		store.put_object("hi_res_input", "clip.mp4", b"hello".to_vec(), "video/mp4").await.unwrap();
		let bytes = store.get_object("hi_res_input", "clip.mp4").await.unwrap();
		assert_eq!(bytes, b"hello");
		assert_eq!(store.object_num_bytes("hi_res_input", "clip.mp4").await.unwrap(), 5);
	}

	#[tokio::test]
	async fn copies_an_object_to_a_local_path() {
		let dir = tempfile::tempdir().unwrap();
		let store = FilesystemObjectStore::new(dir.path().to_path_buf());
		store.put_object("hi_res_input", "clip.mp4", b"hello".to_vec(), "video/mp4").await.unwrap();
		let dest = dir.path().join("copied.mp4");
		let written = store.copy_to_path("hi_res_input", "clip.mp4", &dest).await.unwrap();
		assert_eq!(written, 5);
		assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"hello");
	}

	#[tokio::test]
	async fn missing_object_is_not_found() {
		let dir = tempfile::tempdir().unwrap();
		let store = FilesystemObjectStore::new(dir.path().to_path_buf());
		let err = store.get_object("hi_res_input", "missing.mp4").await.unwrap_err();
		assert_eq!(err.kind, crate::error::ObjectStoreErrorKind::NotFound);
	}

	#[tokio::test]
	async fn mounted_path_is_bucket_joined_with_name() {
		let dir = tempfile::tempdir().unwrap();
		let store = FilesystemObjectStore::new(dir.path().to_path_buf());
		let path = store.mounted_path("lo_res_output", "clip.mp4").unwrap();
		assert_eq!(path, dir.path().join("lo_res_output").join("clip.mp4"));
	}
}
