use std::sync::Arc;

use async_trait::async_trait;
use mediasearch_media::Media;
use mediasearch_pipeline::{PipelineContext, Step, StepMeta};
use mediasearch_storage::ColumnarStore;

use crate::keys::MEDIA_KEY;

/// Streams the assembled [`Media`] into the columnar store's media table.
/// `id` is content-derived (UUIDv5 over the object name), so a redelivered
/// notification re-inserts the same logical row rather than creating a
/// duplicate; this is left to the store's own insert semantics.
pub struct PersistMedia {
	meta: StepMeta,
	store: Arc<dyn ColumnarStore>,
}

impl PersistMedia {
	pub fn new(store: Arc<dyn ColumnarStore>) -> Self {
		Self { meta: StepMeta::new("persist_media"), store }
	}
}

#[async_trait]
impl Step for PersistMedia {
	fn meta(&self) -> &StepMeta {
		&self.meta
	}

	async fn execute(&self, ctx: &mut PipelineContext) {
		let media = match ctx.get::<Media>(self.input_key()) {
			Some(media) => media.clone(),
			None => {
				ctx.add_error(self.name(), "missing assembled media to persist");
				return;
			},
		};

		if let Err(err) = self.store.insert_media(&media).await {
			ctx.add_error(self.name(), format!("failed to insert media: {err}"));
			return;
		}
		ctx.put(self.output_key(), media);
	}
}
