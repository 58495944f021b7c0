use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A bus notification as actually received: at least `bucket`, `name`,
/// `contentType`, plus whatever else the platform attaches (generation,
/// md5, size, timeCreated...). The extra fields are preserved but never
/// required by anything downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
	pub bucket: String,
	pub name: String,
	#[serde(rename = "contentType")]
	pub content_type: String,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
