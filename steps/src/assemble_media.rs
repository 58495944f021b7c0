use std::sync::Arc;

use async_trait::async_trait;
use mediasearch_media::{assemble_media, CategoryRegistry, GcsObject, MediaSummary, Scene};
use mediasearch_objectstore::ObjectStore;
use mediasearch_pipeline::{PipelineContext, Step, StepMeta};

use crate::keys::{GCS_OBJECT_KEY, MEDIA_KEY, MEDIA_SUMMARY_KEY, SCENES_KEY};

/// Combines the [`MediaSummary`] and extracted [`Scene`]s into a [`Media`],
/// deriving `id` from the object's name and validating category/scene
/// invariants before the result is persisted.
pub struct AssembleMedia {
	meta: StepMeta,
	object_store: Arc<dyn ObjectStore>,
	categories: Arc<CategoryRegistry>,
}

impl AssembleMedia {
	pub fn new(object_store: Arc<dyn ObjectStore>, categories: Arc<CategoryRegistry>) -> Self {
		Self { meta: StepMeta::new("assemble_media"), object_store, categories }
	}
}

#[async_trait]
impl Step for AssembleMedia {
	fn meta(&self) -> &StepMeta {
		&self.meta
	}

	async fn execute(&self, ctx: &mut PipelineContext) {
		let summary = match ctx.get::<MediaSummary>(MEDIA_SUMMARY_KEY).cloned() {
			Some(summary) => summary,
			None => {
				ctx.add_error(self.name(), "missing media summary to assemble");
				return;
			},
		};
		let scenes = match ctx.get::<Vec<Scene>>(SCENES_KEY).cloned() {
			Some(scenes) => scenes,
			None => {
				ctx.add_error(self.name(), "missing extracted scenes to assemble");
				return;
			},
		};
		let object = match ctx.get::<GcsObject>(GCS_OBJECT_KEY).cloned() {
			Some(object) => object,
			None => {
				ctx.add_error(self.name(), "missing gcs object to assemble");
				return;
			},
		};

		let media_url = self.object_store.object_url(&object.bucket, &object.name);
		match assemble_media(&object.name, media_url, summary, scenes, &self.categories) {
			Ok(media) => {
				ctx.put(MEDIA_KEY, media.clone());
				ctx.put(self.output_key(), media);
			},
			Err(err) => ctx.add_error(self.name(), err),
		}
	}
}
