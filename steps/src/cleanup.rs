use async_trait::async_trait;
use mediasearch_pipeline::{PipelineContext, Step, StepMeta};

/// Releases any model-side file handles opened on behalf of this run. A
/// no-op here because the configured model accepts remote URIs directly
/// rather than uploaded file handles; kept as an explicit pipeline step so
/// a future model backend that does require handle cleanup has a place to
/// hook in without reshaping the pipeline.
pub struct Cleanup {
	meta: StepMeta,
}

impl Cleanup {
	pub fn new() -> Self {
		Self { meta: StepMeta::new("cleanup") }
	}
}

impl Default for Cleanup {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Step for Cleanup {
	fn meta(&self) -> &StepMeta {
		&self.meta
	}

	async fn execute(&self, _ctx: &mut PipelineContext) {}

	fn is_runnable(&self, _ctx: &PipelineContext) -> bool {
		true
	}
}
