use std::{num::NonZeroU32, sync::Arc};

use governor::{Quota, RateLimiter};
use mediasearch_pipeline::PipelineContext;

use crate::{error::ModelResult, generative::EmbeddingModel, invoker::cancellable_sleep};

type DirectRateLimiter = RateLimiter<
	governor::state::direct::NotKeyed,
	governor::state::InMemoryState,
	governor::clock::DefaultClock,
>;

/// Rate-limited front end to a text embedding model, configured from
/// `embedding_models.<logical>.max_requests_per_minute`. Embeddings are
/// idempotent and cheap to retry, so this wraps only the quota-denied
/// backoff path, not the 60-second failure backoff `ModelInvoker` adds for
/// the (much more expensive, much more rate-limited) generative calls.
pub struct EmbeddingInvoker {
	model_name: String,
	limiter: DirectRateLimiter,
	inner: Arc<dyn EmbeddingModel>,
}

impl EmbeddingInvoker {
	pub fn new(model_name: impl Into<String>, max_requests_per_minute: NonZeroU32, inner: Arc<dyn EmbeddingModel>) -> Self {
		let per_second = NonZeroU32::new((max_requests_per_minute.get() / 60).max(1)).unwrap();
		Self { model_name: model_name.into(), limiter: RateLimiter::direct(Quota::per_second(per_second)), inner }
	}

	pub fn model_name(&self) -> &str {
		&self.model_name
	}

	pub async fn embed(&self, ctx: &PipelineContext, text: &str) -> ModelResult<Vec<f64>> {
		loop {
			if self.limiter.check().is_ok() {
				return self.inner.embed(&self.model_name, text).await;
			}
			cancellable_sleep(std::time::Duration::from_secs(5), ctx).await;
		}
	}
}
