use std::sync::Arc;

use mediasearch_media::CategoryRegistry;
use mediasearch_modelinvoker::ModelInvoker;
use mediasearch_objectstore::ObjectStore;
use mediasearch_pipeline::Pipeline;
use mediasearch_steps::{
	AssembleMedia, Cleanup, ParseNotification, PersistMedia, RequestSummary, SceneExtractor, SummaryJsonToStruct,
};
use mediasearch_storage::ColumnarStore;

/// The `prompts.{summary, scene}` templates and the optional worker-count
/// override needed to wire an [`AnalyzeWorkflow`].
#[derive(Debug, Clone)]
pub struct AnalyzeWorkflowConfig {
	pub summary_template: String,
	pub scene_template: String,
	pub worker_count: Option<usize>,
}

/// Builds the pipeline attached to the lo-res bucket's notification
/// subscription: parse, summarize, extract scenes in parallel, assemble,
/// persist, clean up.
#[allow(clippy::too_many_arguments)]
pub fn build(
	object_store: Arc<dyn ObjectStore>,
	summary_invoker: Arc<ModelInvoker>,
	scene_invoker: Arc<ModelInvoker>,
	categories: Arc<CategoryRegistry>,
	store: Arc<dyn ColumnarStore>,
	config: AnalyzeWorkflowConfig,
) -> Pipeline {
	Pipeline::new("analyze_workflow")
		.add_step(Arc::new(ParseNotification::new()))
		.add_step(Arc::new(RequestSummary::new(
			summary_invoker,
			object_store.clone(),
			categories.clone(),
			config.summary_template,
		)))
		.add_step(Arc::new(SummaryJsonToStruct::new(object_store.clone())))
		.add_step(Arc::new(SceneExtractor::new(
			scene_invoker,
			object_store.clone(),
			config.scene_template,
			config.worker_count,
		)))
		.add_step(Arc::new(AssembleMedia::new(object_store, categories)))
		.add_step(Arc::new(PersistMedia::new(store)))
		.add_step(Arc::new(Cleanup::new()))
}
