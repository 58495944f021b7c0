use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The `storage.{hi_res_bucket, lo_res_bucket, fuse_mount_point?}`
/// configuration block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
	pub hi_res_bucket: String,
	pub lo_res_bucket: String,
	#[serde(default)]
	pub fuse_mount_point: Option<PathBuf>,
}

impl ObjectStoreConfig {
	pub fn buckets(&self) -> [&str; 2] {
		[self.hi_res_bucket.as_str(), self.lo_res_bucket.as_str()]
	}
}

/// Base64-encoded service account credentials, kept out of
/// [`ObjectStoreConfig`] so the config struct stays safe to log/debug-print.
#[derive(Clone)]
pub struct GcsCredentials(pub String);
