use async_trait::async_trait;
use mediasearch_media::{Media, Scene, SceneEmbedding};
use uuid::Uuid;

use crate::error::StorageResult;

/// A scene/distance pair returned by [`ColumnarStore::vector_search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMatch {
	pub media_id: Uuid,
	pub sequence: u32,
}

/// The columnar analytic store backing both the `media` table and the
/// `scene_embeddings` table, and the VECTOR_SEARCH primitive over the
/// latter.
#[async_trait]
pub trait ColumnarStore: Send + Sync {
	async fn check_connectivity(&self) -> StorageResult<()>;

	/// Streaming-inserts one row into the media table. Duplicate inserts
	/// for the same content-derived `id` are tolerated, never rejected:
	/// ingestion is at-least-once, so this must not error on a row that's
	/// already present.
	async fn insert_media(&self, media: &Media) -> StorageResult<()>;

	async fn get_media(&self, id: Uuid) -> StorageResult<Option<Media>>;

	async fn get_scene(&self, id: Uuid, sequence: u32) -> StorageResult<Option<Scene>>;

	/// `SELECT * FROM media WHERE id NOT IN (SELECT media_id FROM
	/// scene_embeddings)` — the EmbedWorker's per-tick eligibility query.
	async fn media_without_embeddings(&self) -> StorageResult<Vec<Media>>;

	/// Streaming-inserts one Media's full batch of scene embeddings.
	/// Implementations must not leave a partial batch for a Media on
	/// failure: either the whole batch lands, or none of it does.
	async fn insert_scene_embeddings(&self, embeddings: &[SceneEmbedding]) -> StorageResult<()>;

	/// A VECTOR_SEARCH over the embeddings table using Euclidean distance,
	/// ordered ascending by distance, truncated to `top_k` rows.
	async fn vector_search(&self, query_embedding: &[f64], top_k: u32) -> StorageResult<Vec<SceneMatch>>;
}
