use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use crate::{
	context::{PipelineContext, TraceContext, OUT_KEY},
	step::{Step, StepMeta},
};

/// A Pipeline *is* a Step: an ordered composite over child Steps.
///
/// Execution is strictly sequential. By default a step that already observed
/// `ctx.has_errors()` aborts the remaining steps (their spans are still
/// opened and immediately closed, marked skipped); set
/// `continue_on_failure(true)` to run every step regardless.
pub struct Pipeline {
	meta: StepMeta,
	steps: Vec<Arc<dyn Step>>,
	continue_on_failure: bool,
}

impl Pipeline {
	pub fn new(name: impl Into<String>) -> Self {
		Self { meta: StepMeta::new(name), steps: Vec::new(), continue_on_failure: false }
	}

	pub fn continue_on_failure(mut self, yes: bool) -> Self {
		self.continue_on_failure = yes;
		self
	}

	pub fn add_step(mut self, step: Arc<dyn Step>) -> Self {
		self.steps.push(step);
		self
	}

	pub fn steps(&self) -> &[Arc<dyn Step>] {
		&self.steps
	}
}

#[async_trait]
impl Step for Pipeline {
	fn meta(&self) -> &StepMeta {
		&self.meta
	}

	fn is_runnable(&self, _ctx: &PipelineContext) -> bool {
		true
	}

	async fn execute(&self, ctx: &mut PipelineContext) {
		let t0 = ctx.trace_context().cloned();

		let run_span = {
			let _entered = t0.as_ref().map(|tc| tc.span.enter());
			tracing::info_span!("pipeline_execute", pipeline = %self.name())
		};
		let run_tc = t0
			.as_ref()
			.map(|tc| tc.child_span(run_span.clone()))
			.unwrap_or_else(|| TraceContext::root(run_span.clone()));
		ctx.with_trace_context(run_tc.clone());

		for step in &self.steps {
			let step_span = {
				let _entered = run_span.enter();
				tracing::info_span!("step", name = %step.name())
			};

			if (ctx.has_errors() && !self.continue_on_failure) || ctx.is_cancelled() {
				step_span.in_scope(|| tracing::debug!("skipped due to prior error or cancellation"));
				break;
			}

			if step.is_runnable(ctx) {
				let step_tc = run_tc.child_span(step_span.clone());
				ctx.with_trace_context(step_tc);
				step.execute(ctx).instrument(step_span.clone()).await;
				ctx.with_trace_context(run_tc.clone());
			} else {
				step_span.in_scope(|| tracing::debug!("not runnable"));
			}

			if ctx.has_errors() {
				step.meta().error_counter.inc();
				step_span.in_scope(|| tracing::warn!("step completed with errors"));
			} else {
				step.meta().success_counter.inc();
			}
			drop(step_span);

			let piped = ctx.take_any(OUT_KEY);
			ctx.take_any(crate::context::IN_KEY);
			if let Some(value) = piped {
				ctx.put_any(crate::context::IN_KEY, value);
			}
		}

		if let Some(t0) = t0 {
			ctx.with_trace_context(t0);
		}

		if ctx.has_errors() {
			self.meta.error_counter.inc();
			run_span.in_scope(|| tracing::warn!("pipeline completed with errors"));
		} else {
			self.meta.success_counter.inc();
		}
	}
}
