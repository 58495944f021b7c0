use std::sync::Arc;

use mediasearch_modelinvoker::EmbeddingInvoker;
use mediasearch_pipeline::PipelineContext;
use mediasearch_storage::{ColumnarStore, SceneMatch};
use uuid::Uuid;

/// Embeds a query and runs a VECTOR_SEARCH over the embeddings table.
/// Hydration of the matched `(media_id, sequence)` pairs into full
/// Media/Scene payloads and signed-URL minting live outside this core, in
/// whatever HTTP layer wraps it.
pub struct SearchService {
	store: Arc<dyn ColumnarStore>,
	embedder: Arc<EmbeddingInvoker>,
}

impl SearchService {
	pub fn new(store: Arc<dyn ColumnarStore>, embedder: Arc<EmbeddingInvoker>) -> Self {
		Self { store, embedder }
	}

	pub async fn find_scenes(&self, ctx: &PipelineContext, query_text: &str, k: u32) -> anyhow::Result<Vec<(Uuid, u32)>> {
		let query_embedding = self.embedder.embed(ctx, query_text).await?;
		let matches: Vec<SceneMatch> = self.store.vector_search(&query_embedding, k).await?;
		Ok(matches.into_iter().map(|m| (m.media_id, m.sequence)).collect())
	}
}

#[cfg(test)]
mod tests {
	use std::num::NonZeroU32;

	use async_trait::async_trait;
	use mediasearch_media::{Media, Scene};
	use mediasearch_modelinvoker::{EmbeddingModel, ModelResult};
	use mediasearch_pipeline::TraceContext;
	use mediasearch_storage::StorageResult;
	use tracing::Span;

	use super::*;

	struct FakeStore;

	#[async_trait]
	impl ColumnarStore for FakeStore {
		async fn check_connectivity(&self) -> StorageResult<()> {
			Ok(())
		}

		async fn insert_media(&self, _media: &Media) -> StorageResult<()> {
			Ok(())
		}

		async fn get_media(&self, _id: Uuid) -> StorageResult<Option<Media>> {
			Ok(None)
		}

		async fn get_scene(&self, _id: Uuid, _sequence: u32) -> StorageResult<Option<Scene>> {
			Ok(None)
		}

		async fn media_without_embeddings(&self) -> StorageResult<Vec<Media>> {
			Ok(Vec::new())
		}

		async fn insert_scene_embeddings(&self, _embeddings: &[mediasearch_media::SceneEmbedding]) -> StorageResult<()> {
			Ok(())
		}

		async fn vector_search(&self, query_embedding: &[f64], top_k: u32) -> StorageResult<Vec<SceneMatch>> {
			let matches = (0..top_k)
				.map(|i| SceneMatch { media_id: Uuid::from_u128(query_embedding[0] as u128), sequence: i + 1 })
				.collect();
			Ok(matches)
		}
	}

	struct FakeEmbeddingModel;

	#[async_trait]
	impl EmbeddingModel for FakeEmbeddingModel {
		async fn embed(&self, _model: &str, text: &str) -> ModelResult<Vec<f64>> {
			Ok(vec![text.len() as f64])
		}
	}

	#[tokio::test]
	async fn find_scenes_is_deterministic_for_a_fixed_query() {
		let service = SearchService::new(
			Arc::new(FakeStore),
			Arc::new(EmbeddingInvoker::new("text-embed", NonZeroU32::new(6000).unwrap(), Arc::new(FakeEmbeddingModel))),
		);
		let mut ctx = PipelineContext::new();
		ctx.with_trace_context(TraceContext::root(Span::none()));

		let first = service.find_scenes(&ctx, "Scenes that Woody Harrelson", 5).await.unwrap();
		let second = service.find_scenes(&ctx, "Scenes that Woody Harrelson", 5).await.unwrap();
		assert_eq!(first.len(), 5);
		assert_eq!(first, second);
	}
}
