use std::{sync::Arc, time::Duration};

use mediasearch_media::{Media, SceneEmbedding};
use mediasearch_modelinvoker::EmbeddingInvoker;
use mediasearch_pipeline::{PipelineContext, TraceContext};
use mediasearch_storage::ColumnarStore;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};

const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Periodic task embedding every scene of every still-unembedded Media.
/// Each Media is its own batch: a failure partway through one Media's
/// scenes aborts only that Media's insert, never touching other Media in
/// the same tick, and a later tick naturally re-processes whatever is
/// still missing since eligibility is recomputed from scratch every time.
pub struct EmbedWorker {
	store: Arc<dyn ColumnarStore>,
	embedder: Arc<EmbeddingInvoker>,
}

impl EmbedWorker {
	pub fn new(store: Arc<dyn ColumnarStore>, embedder: Arc<EmbeddingInvoker>) -> Self {
		Self { store, embedder }
	}

	/// Spawns the periodic task. Only one tick runs at a time; a tick that
	/// overruns the interval delays the next one rather than overlapping it.
	pub fn run(self: Arc<Self>, trace_context: TraceContext) -> JoinHandle<()> {
		tokio::spawn(async move {
			let mut interval = tokio::time::interval(TICK_INTERVAL);
			while !trace_context.is_cancelled() {
				interval.tick().await;
				if trace_context.is_cancelled() {
					break;
				}
				let span = info_span!("embed_worker_tick");
				self.tick(trace_context.child_span(span.clone())).instrument(span).await;
			}
		})
	}

	async fn tick(&self, trace_context: TraceContext) {
		let mut ctx = PipelineContext::new();
		ctx.with_trace_context(trace_context.clone());

		let media = match self.store.media_without_embeddings().await {
			Ok(media) => media,
			Err(err) => {
				error!(error = %err, "failed to list media without embeddings");
				return;
			},
		};
		if media.is_empty() {
			return;
		}
		info!(count = media.len(), "embedding eligible media");

		for item in media {
			if trace_context.is_cancelled() {
				break;
			}
			if let Err(err) = self.embed_one(&ctx, &item).await {
				warn!(media_id = %item.id, error = %err, "failed to embed media, skipping for this tick");
			}
		}
	}

	async fn embed_one(&self, ctx: &PipelineContext, media: &Media) -> anyhow::Result<()> {
		let mut embeddings = Vec::with_capacity(media.scenes.len());
		for scene in &media.scenes {
			let vector = self.embedder.embed(ctx, &scene.script).await?;
			embeddings.push(SceneEmbedding {
				media_id: media.id,
				sequence: scene.sequence,
				model_name: self.embedder.model_name().to_string(),
				embeddings: vector,
			});
		}
		self.store.insert_scene_embeddings(&embeddings).await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::{num::NonZeroU32, sync::Mutex};

	use async_trait::async_trait;
	use chrono::Utc;
	use mediasearch_media::{Rating, Scene};
	use mediasearch_modelinvoker::{EmbeddingModel, ModelResult};
	use mediasearch_storage::{StorageError, StorageResult};
	use tracing::Span;
	use uuid::Uuid;

	use super::*;

	struct FakeStore {
		media: Vec<Media>,
		inserted: Mutex<Vec<SceneEmbedding>>,
	}

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
			Ok(self.media.clone())
		}

		async fn insert_scene_embeddings(&self, embeddings: &[SceneEmbedding]) -> StorageResult<()> {
			if embeddings.iter().any(|e| e.media_id == fail_media_id()) {
				return Err(StorageError::internal(anyhow::anyhow!("forced failure")));
			}
			self.inserted.lock().unwrap().extend_from_slice(embeddings);
			Ok(())
		}

		async fn vector_search(&self, _query_embedding: &[f64], _top_k: u32) -> StorageResult<Vec<mediasearch_storage::SceneMatch>> {
			Ok(Vec::new())
		}
	}

	struct FakeEmbeddingModel;

	#[async_trait]
	impl EmbeddingModel for FakeEmbeddingModel {
		async fn embed(&self, _model: &str, text: &str) -> ModelResult<Vec<f64>> {
			Ok(vec![text.len() as f64])
		}
	}

	fn fail_media_id() -> Uuid {
		Uuid::from_u128(0xdead)
	}

	fn media_with(id: Uuid, scenes: Vec<Scene>) -> Media {
		Media {
			id,
			title: "t".to_string(),
			category: "action".to_string(),
			summary: "s".to_string(),
			length_seconds: 30,
			media_url: "https://example/x".to_string(),
			director: "d".to_string(),
			release_year: 2020,
			genre: "g".to_string(),
			rating: Rating::Pg13,
			cast: vec![],
			scenes,
			create_date: Utc::now(),
		}
	}

	fn scene(sequence: u32) -> Scene {
		Scene { sequence, start: "00:00:00".to_string(), end: "00:00:10".to_string(), script: "hello".to_string() }
	}

	#[tokio::test]
	async fn embeds_every_scene_of_every_eligible_media() {
		let good = media_with(Uuid::from_u128(1), vec![scene(1), scene(2)]);
		let store = Arc::new(FakeStore { media: vec![good], inserted: Mutex::new(Vec::new()) });
		let embedder = Arc::new(EmbeddingInvoker::new("text-embed", NonZeroU32::new(6000).unwrap(), Arc::new(FakeEmbeddingModel)));
		let worker = EmbedWorker::new(store.clone(), embedder);
		worker.tick(TraceContext::root(Span::none())).await;
		assert_eq!(store.inserted.lock().unwrap().len(), 2);
	}

	#[tokio::test]
	async fn one_media_failure_does_not_block_the_tick() {
		let failing = media_with(fail_media_id(), vec![scene(1)]);
		let store = Arc::new(FakeStore { media: vec![failing], inserted: Mutex::new(Vec::new()) });
		let embedder = Arc::new(EmbeddingInvoker::new("text-embed", NonZeroU32::new(6000).unwrap(), Arc::new(FakeEmbeddingModel)));
		let worker = EmbedWorker::new(store.clone(), embedder);
		worker.tick(TraceContext::root(Span::none())).await;
		assert!(store.inserted.lock().unwrap().is_empty());
	}
}
