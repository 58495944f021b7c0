use async_trait::async_trait;
use mediasearch_common::metrics::{new_counter, IntCounter};

use crate::context::{PipelineContext, IN_KEY, OUT_KEY};

/// Name/metrics bundle every [`Step`] owns, composed rather than inherited.
pub struct StepMeta {
	pub name: String,
	pub input_key: String,
	pub output_key: String,
	pub success_counter: IntCounter,
	pub error_counter: IntCounter,
}

impl StepMeta {
	pub fn new(name: impl Into<String>) -> Self {
		Self::with_keys(name, IN_KEY, OUT_KEY)
	}

	pub fn with_keys(name: impl Into<String>, input_key: impl Into<String>, output_key: impl Into<String>) -> Self {
		let name = name.into();
		let success_counter = new_counter(
			&format!("{name}_success_total"),
			&format!("successful executions of step {name}"),
			"mediasearch",
		);
		let error_counter = new_counter(
			&format!("{name}_error_total"),
			&format!("failed executions of step {name}"),
			"mediasearch",
		);
		Self { name, input_key: input_key.into(), output_key: output_key.into(), success_counter, error_counter }
	}
}

/// An atomic, idempotent unit of work over a shared [`PipelineContext`].
///
/// A `Step` never panics out of `execute`; failures are reported through
/// `ctx.add_error(name, err)` instead so a [`crate::Pipeline`] can decide,
/// per its `continue_on_failure` setting, whether to keep going.
#[async_trait]
pub trait Step: Send + Sync {
	fn meta(&self) -> &StepMeta;

	async fn execute(&self, ctx: &mut PipelineContext);

	fn name(&self) -> &str {
		&self.meta().name
	}

	fn input_key(&self) -> &str {
		&self.meta().input_key
	}

	fn output_key(&self) -> &str {
		&self.meta().output_key
	}

	fn is_runnable(&self, ctx: &PipelineContext) -> bool {
		ctx.bag().contains(self.input_key()) && ctx.trace_context().is_some() && !ctx.is_cancelled()
	}
}
