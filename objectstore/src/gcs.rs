use std::{collections::HashMap, path::{Path, PathBuf}};

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use opendal::Operator;

use crate::{
	config::{GcsCredentials, ObjectStoreConfig},
	error::{ObjectStoreError, ObjectStoreResult},
	store::{gcs_style_url, ObjectStore},
};

/// A GCS-backed [`ObjectStore`] with one `opendal` operator per configured
/// bucket. Buckets are opened eagerly at construction so connectivity
/// problems surface at startup rather than on first use.
#[derive(Clone)]
pub struct GcsObjectStore {
	operators: HashMap<String, Operator>,
	fuse_mount_point: Option<PathBuf>,
}

impl GcsObjectStore {
	pub fn new(config: &ObjectStoreConfig, credentials: &GcsCredentials) -> ObjectStoreResult<Self> {
		let encoded = general_purpose::STANDARD.encode(&credentials.0);
		let mut operators = HashMap::new();
		for bucket in config.buckets() {
			let mut cfg = opendal::services::Gcs::default();
			cfg.credential(&encoded);
			cfg.bucket(bucket);
			let op = Operator::new(cfg)?.finish();
			operators.insert(bucket.to_string(), op);
		}
		Ok(Self { operators, fuse_mount_point: config.fuse_mount_point.clone() })
	}

	fn operator(&self, bucket: &str) -> ObjectStoreResult<&Operator> {
		self.operators
			.get(bucket)
			.ok_or_else(|| ObjectStoreError::not_found(format!("bucket '{bucket}' is not configured")))
	}
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
	async fn check_connectivity(&self) -> ObjectStoreResult<()> {
		for op in self.operators.values() {
			op.check().await?;
		}
		Ok(())
	}

	async fn get_object(&self, bucket: &str, name: &str) -> ObjectStoreResult<Vec<u8>> {
		let bytes = self.operator(bucket)?.read(name).await?;
		Ok(bytes)
	}

	async fn put_object(
		&self,
		bucket: &str,
		name: &str,
		bytes: Vec<u8>,
		mime_type: &str,
	) -> ObjectStoreResult<()> {
		self.operator(bucket)?
			.write_with(name, bytes)
			.content_type(mime_type)
			.await?;
		Ok(())
	}

	async fn copy_to_path(&self, bucket: &str, name: &str, dest: &Path) -> ObjectStoreResult<u64> {
		let mut reader = self.operator(bucket)?.reader(name).await?;
		let mut file = tokio::fs::File::create(dest).await?;
		let written = tokio::io::copy(&mut reader, &mut file).await?;
		Ok(written)
	}

	async fn object_num_bytes(&self, bucket: &str, name: &str) -> ObjectStoreResult<u64> {
		let meta = self.operator(bucket)?.stat(name).await?;
		Ok(meta.content_length())
	}

	fn object_url(&self, bucket: &str, name: &str) -> String {
		gcs_style_url(bucket, name)
	}

	fn mounted_path(&self, bucket: &str, name: &str) -> Option<PathBuf> {
		self.fuse_mount_point.as_ref().map(|mount| mount.join(bucket).join(name))
	}
}
