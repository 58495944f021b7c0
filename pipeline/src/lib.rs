pub mod context;
pub use context::{PipelineContext, StepError, TraceContext, IN_KEY, OUT_KEY};
pub mod step;
pub use step::{Step, StepMeta};
pub mod pipeline;
pub use pipeline::Pipeline;

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use async_trait::async_trait;
	use tracing::Span;

	use super::*;
	use crate::context::TraceContext;

	struct Upper {
		meta: StepMeta,
	}

	impl Upper {
		fn new(name: &str) -> Self {
			Self { meta: StepMeta::new(name) }
		}
	}

	#[async_trait]
	impl Step for Upper {
		fn meta(&self) -> &StepMeta {
			&self.meta
		}

		async fn execute(&self, ctx: &mut PipelineContext) {
			let input: String = ctx.get::<String>(self.input_key()).cloned().unwrap_or_default();
			ctx.put(self.output_key(), input.to_uppercase());
		}
	}

	struct AlwaysFails {
		meta: StepMeta,
	}

	impl AlwaysFails {
		fn new(name: &str) -> Self {
			Self { meta: StepMeta::new(name) }
		}
	}

	#[async_trait]
	impl Step for AlwaysFails {
		fn meta(&self) -> &StepMeta {
			&self.meta
		}

		async fn execute(&self, ctx: &mut PipelineContext) {
			ctx.add_error(self.name(), "boom");
		}
	}

	fn ctx_with_input(value: &str) -> PipelineContext {
		let mut ctx = PipelineContext::new();
		ctx.put(IN_KEY, value.to_string());
		ctx.with_trace_context(TraceContext::root(Span::none()));
		ctx
	}

	#[tokio::test]
	async fn piping_invariant_holds_between_steps() {
		let pipeline = Pipeline::new("upper_twice")
			.add_step(Arc::new(Upper::new("first")))
			.add_step(Arc::new(Upper::new("second")));
		let mut ctx = ctx_with_input("ab");
		pipeline.execute(&mut ctx).await;
		assert!(!ctx.has_errors());
		assert_eq!(ctx.get::<String>(IN_KEY), Some(&"AB".to_string()));
		assert!(!ctx.bag().contains(OUT_KEY));
	}

	#[tokio::test]
	async fn skip_on_error_by_default() {
		let pipeline = Pipeline::new("fails_then_upper")
			.add_step(Arc::new(AlwaysFails::new("boom_step")))
			.add_step(Arc::new(Upper::new("never_runs")));
		let mut ctx = ctx_with_input("ab");
		pipeline.execute(&mut ctx).await;
		assert!(ctx.has_errors());
		// The input key still holds the original lowercase value: "never_runs" never executed.
		assert_eq!(ctx.get::<String>(IN_KEY), Some(&"ab".to_string()));
	}

	#[tokio::test]
	async fn continue_on_failure_runs_every_step() {
		let pipeline = Pipeline::new("fails_then_upper")
			.continue_on_failure(true)
			.add_step(Arc::new(AlwaysFails::new("boom_step")))
			.add_step(Arc::new(Upper::new("still_runs")));
		let mut ctx = ctx_with_input("ab");
		pipeline.execute(&mut ctx).await;
		assert!(ctx.has_errors());
		assert_eq!(ctx.get::<String>(IN_KEY), Some(&"AB".to_string()));
	}

	#[tokio::test]
	async fn not_runnable_without_trace_context() {
		let mut ctx = PipelineContext::new();
		ctx.put(IN_KEY, "x".to_string());
		let step = Upper::new("needs_trace");
		assert!(!step.is_runnable(&ctx));
	}
}
