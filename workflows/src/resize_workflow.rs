use std::sync::Arc;

use mediasearch_objectstore::ObjectStore;
use mediasearch_pipeline::Pipeline;
use mediasearch_steps::{external_transcode::TranscodeConfig, ExternalTranscode, ParseNotification};

/// Builds the pipeline attached to the hi-res bucket's notification
/// subscription: parse the notification, transcode to the lo-res bucket.
pub fn build(object_store: Arc<dyn ObjectStore>, transcode_config: TranscodeConfig) -> Pipeline {
	Pipeline::new("resize_workflow")
		.add_step(Arc::new(ParseNotification::new()))
		.add_step(Arc::new(ExternalTranscode::new(object_store, transcode_config)))
}
