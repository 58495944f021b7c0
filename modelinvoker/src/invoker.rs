use std::{num::NonZeroU32, sync::Arc, time::Duration};

use governor::{Quota, RateLimiter};
use mediasearch_pipeline::PipelineContext;
use tracing::{debug, warn};

use crate::{
	error::{ModelError, ModelErrorKind, ModelResult},
	generative::{ContentPart, GenerationConfig, GenerativeModel},
};

type DirectRateLimiter = RateLimiter<
	governor::state::direct::NotKeyed,
	governor::state::InMemoryState,
	governor::clock::DefaultClock,
>;

const RATE_LIMIT_DENIED_SLEEP: Duration = Duration::from_secs(5);
const FAILURE_RETRY_SLEEP: Duration = Duration::from_secs(60);
const MAX_FAILURE_RETRIES: u32 = 3;

/// Sleeps in short increments so an ambient cancellation signal is honored
/// instead of blocking for the full duration regardless.
pub(crate) async fn cancellable_sleep(duration: Duration, ctx: &PipelineContext) {
	const TICK: Duration = Duration::from_millis(200);
	let mut remaining = duration;
	while remaining > Duration::ZERO {
		if ctx.is_cancelled() {
			debug!("sleep cut short by cancellation");
			return;
		}
		let step = remaining.min(TICK);
		tokio::time::sleep(step).await;
		remaining -= step;
	}
}

/// Rate-limited, retry-aware front end to a multimodal generative model.
///
/// Holds a token-bucket limiter configured as `{requests/second,
/// burst=requests/second}`, the model name and its default
/// [`GenerationConfig`]. Two independent failure paths are handled inside
/// `generate`: a limiter denial (quota exhaustion) backs off 5 seconds and
/// retries indefinitely; a call failure backs off 60 seconds and retries up
/// to [`MAX_FAILURE_RETRIES`] times before giving up. Unlike the reference
/// implementation this retry count is a local loop variable, not threaded
/// through the ambient context, so one invoker's backoff can never leak
/// into an unrelated caller's retry bookkeeping.
pub struct ModelInvoker {
	model_name: String,
	config: GenerationConfig,
	limiter: DirectRateLimiter,
	inner: Arc<dyn GenerativeModel>,
}

impl ModelInvoker {
	pub fn new(
		model_name: impl Into<String>,
		config: GenerationConfig,
		requests_per_second: NonZeroU32,
		inner: Arc<dyn GenerativeModel>,
	) -> Self {
		Self {
			model_name: model_name.into(),
			config,
			limiter: RateLimiter::direct(Quota::per_second(requests_per_second)),
			inner,
		}
	}

	pub fn model_name(&self) -> &str {
		&self.model_name
	}

	pub fn config(&self) -> &GenerationConfig {
		&self.config
	}

	/// Calls the underlying model, honoring the rate limiter and the
	/// 60-second/3-try failure backoff described on the type.
	pub async fn generate(
		&self,
		ctx: &PipelineContext,
		content: &[ContentPart],
	) -> ModelResult<crate::generative::GenerateResponse> {
		let mut failure_retries = 0u32;
		loop {
			if ctx.is_cancelled() {
				return Err(ModelError::call(anyhow::anyhow!("cancelled before call")));
			}
			if self.limiter.check().is_err() {
				cancellable_sleep(RATE_LIMIT_DENIED_SLEEP, ctx).await;
				if ctx.is_cancelled() {
					return Err(ModelError::call(anyhow::anyhow!("cancelled while rate limited")));
				}
				continue;
			}

			match self.inner.generate(&self.model_name, &self.config, content).await {
				Ok(response) => return Ok(response),
				Err(err) => {
					if failure_retries >= MAX_FAILURE_RETRIES {
						return Err(ModelError::new(
							ModelErrorKind::MaxRetriesExceeded,
							err.source.clone(),
						)
						.add_context("max retries exceeded"));
					}
					failure_retries += 1;
					warn!(attempt = failure_retries, error = %err, "model call failed, backing off");
					cancellable_sleep(FAILURE_RETRY_SLEEP, ctx).await;
				},
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use async_trait::async_trait;
	use mediasearch_pipeline::TraceContext;
	use tokio::sync::Mutex;
	use tracing::Span;

	use super::*;
	use crate::generative::GenerateResponse;

	struct FlakyModel {
		failures_left: Mutex<u32>,
	}

	#[async_trait]
	impl GenerativeModel for FlakyModel {
		async fn generate(
			&self,
			_model: &str,
			_config: &GenerationConfig,
			_parts: &[ContentPart],
		) -> ModelResult<GenerateResponse> {
			let mut left = self.failures_left.lock().await;
			if *left > 0 {
				*left -= 1;
				return Err(ModelError::call(anyhow::anyhow!("transient failure")));
			}
			Ok(GenerateResponse::default())
		}
	}

	fn ctx() -> PipelineContext {
		let mut ctx = PipelineContext::new();
		ctx.with_trace_context(TraceContext::root(Span::none()));
		ctx
	}

	#[tokio::test(start_paused = true)]
	async fn retries_until_success_within_budget() {
		let invoker = ModelInvoker::new(
			"test-model",
			GenerationConfig::default(),
			NonZeroU32::new(100).unwrap(),
			Arc::new(FlakyModel { failures_left: Mutex::new(2) }),
		);
		let result = invoker.generate(&ctx(), &[ContentPart::text("hi")]).await;
		assert!(result.is_ok());
	}

	#[tokio::test(start_paused = true)]
	async fn exhausts_retries_and_surfaces_error() {
		let invoker = ModelInvoker::new(
			"test-model",
			GenerationConfig::default(),
			NonZeroU32::new(100).unwrap(),
			Arc::new(FlakyModel { failures_left: Mutex::new(5) }),
		);
		let result = invoker.generate(&ctx(), &[ContentPart::text("hi")]).await;
		assert_eq!(result.unwrap_err().kind(), ModelErrorKind::MaxRetriesExceeded);
	}
}
