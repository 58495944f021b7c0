use async_trait::async_trait;
use mediasearch_media::{GcsObject, MediaError, MediaSummary};
use mediasearch_objectstore::ObjectStore;
use mediasearch_pipeline::{PipelineContext, Step, StepMeta};
use std::sync::Arc;

use crate::keys::{GCS_OBJECT_KEY, MEDIA_SUMMARY_KEY};

/// Parses the raw JSON produced by [`crate::request_summary::RequestSummary`]
/// into a [`MediaSummary`], filling in `media_url` from the GCSObject since
/// the model is never asked to invent it.
pub struct SummaryJsonToStruct {
	meta: StepMeta,
	object_store: Arc<dyn ObjectStore>,
}

impl SummaryJsonToStruct {
	pub fn new(object_store: Arc<dyn ObjectStore>) -> Self {
		Self { meta: StepMeta::new("summary_json_to_struct"), object_store }
	}
}

#[async_trait]
impl Step for SummaryJsonToStruct {
	fn meta(&self) -> &StepMeta {
		&self.meta
	}

	async fn execute(&self, ctx: &mut PipelineContext) {
		let raw = match ctx.get::<String>(self.input_key()) {
			Some(raw) => raw.clone(),
			None => {
				ctx.add_error(self.name(), "missing raw summary JSON");
				return;
			},
		};
		let object = match ctx.get::<GcsObject>(GCS_OBJECT_KEY).cloned() {
			Some(object) => object,
			None => {
				ctx.add_error(self.name(), "missing gcs object to derive media_url from");
				return;
			},
		};

		let mut summary: MediaSummary = match serde_json::from_str(&raw) {
			Ok(summary) => summary,
			Err(err) => {
				ctx.add_error(self.name(), MediaError::MalformedSummary(err.to_string()));
				return;
			},
		};
		summary.media_url = Some(self.object_store.object_url(&object.bucket, &object.name));

		ctx.put(MEDIA_SUMMARY_KEY, summary.clone());
		ctx.put(self.output_key(), summary);
	}
}

#[cfg(test)]
mod tests {
	use mediasearch_objectstore::FilesystemObjectStore;
	use mediasearch_pipeline::{TraceContext, IN_KEY};
	use tracing::Span;

	use super::*;

	fn store() -> Arc<dyn ObjectStore> {
		Arc::new(FilesystemObjectStore::new(std::env::temp_dir().join("mediasearch-summary-struct-test")))
	}

	#[tokio::test]
	async fn parses_and_fills_media_url() {
		let step = SummaryJsonToStruct::new(store());
		let mut ctx = PipelineContext::new();
		ctx.put(
			IN_KEY,
			r#"{"title":"Test Trailer","category":"action","summary":"a summary","length_seconds":30,"director":"Someone","release_year":2020,"genre":"Action","rating":"PG-13","cast":[],"scene_time_stamps":[]}"#
				.to_string(),
		);
		ctx.put(
			GCS_OBJECT_KEY,
			GcsObject {
				bucket: "media_low_res_resources".to_string(),
				name: "test-trailer-001.mp4".to_string(),
				mime_type: "video/mp4".to_string(),
			},
		);
		ctx.with_trace_context(TraceContext::root(Span::none()));
		step.execute(&mut ctx).await;
		assert!(!ctx.has_errors());
		let summary = ctx.get::<MediaSummary>(MEDIA_SUMMARY_KEY).unwrap();
		assert!(summary.media_url.as_ref().unwrap().contains("test-trailer-001.mp4"));
	}

	#[tokio::test]
	async fn malformed_json_is_an_error() {
		let step = SummaryJsonToStruct::new(store());
		let mut ctx = PipelineContext::new();
		ctx.put(IN_KEY, "not json".to_string());
		ctx.put(
			GCS_OBJECT_KEY,
			GcsObject { bucket: "b".to_string(), name: "n".to_string(), mime_type: "video/mp4".to_string() },
		);
		ctx.with_trace_context(TraceContext::root(Span::none()));
		step.execute(&mut ctx).await;
		assert!(ctx.has_errors());
	}
}
