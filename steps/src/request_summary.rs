use std::sync::Arc;

use async_trait::async_trait;
use mediasearch_common::metrics::{new_counter, IntCounter};
use mediasearch_media::{CategoryRegistry, GcsObject};
use mediasearch_modelinvoker::{generate_multimodal, ContentPart, ModelInvoker};
use mediasearch_objectstore::ObjectStore;
use mediasearch_pipeline::{PipelineContext, Step, StepMeta};

use crate::{keys::GCS_OBJECT_KEY, prompts};

/// Renders the summary prompt with the configured category enumeration and
/// an example-JSON payload, sends it alongside a file reference to the
/// GCSObject, and stores the model's raw (unparsed) JSON response.
pub struct RequestSummary {
	meta: StepMeta,
	invoker: Arc<ModelInvoker>,
	object_store: Arc<dyn ObjectStore>,
	categories: Arc<CategoryRegistry>,
	template: String,
	in_tokens: IntCounter,
	out_tokens: IntCounter,
	retries: IntCounter,
}

impl RequestSummary {
	pub fn new(
		invoker: Arc<ModelInvoker>,
		object_store: Arc<dyn ObjectStore>,
		categories: Arc<CategoryRegistry>,
		template: impl Into<String>,
	) -> Self {
		Self {
			meta: StepMeta::new("request_summary"),
			invoker,
			object_store,
			categories,
			template: template.into(),
			in_tokens: new_counter("request_summary_prompt_tokens_total", "prompt tokens sent by request_summary", "mediasearch"),
			out_tokens: new_counter(
				"request_summary_candidate_tokens_total",
				"candidate tokens received by request_summary",
				"mediasearch",
			),
			retries: new_counter("request_summary_retries_total", "retries performed by request_summary", "mediasearch"),
		}
	}
}

#[async_trait]
impl Step for RequestSummary {
	fn meta(&self) -> &StepMeta {
		&self.meta
	}

	async fn execute(&self, ctx: &mut PipelineContext) {
		let object = match ctx.get::<GcsObject>(GCS_OBJECT_KEY).cloned() {
			Some(object) => object,
			None => {
				ctx.add_error(self.name(), "missing gcs object to summarize");
				return;
			},
		};

		let categories: Vec<(&str, &str)> = self
			.categories
			.keys()
			.filter_map(|key| self.categories.get(key).map(|cfg| (key, cfg.definition.as_str())))
			.collect();
		let vars = prompts::summary_vars(&categories);
		let prompt = match prompts::render(&self.template, &vars) {
			Ok(prompt) => prompt,
			Err(err) => {
				ctx.add_error(self.name(), format!("failed to render summary prompt: {err}"));
				return;
			},
		};

		let file_uri = self.object_store.object_url(&object.bucket, &object.name);
		let content = [ContentPart::text(prompt), ContentPart::file(file_uri, object.mime_type)];

		match generate_multimodal(ctx, &self.in_tokens, &self.out_tokens, &self.retries, &self.invoker, &content).await {
			Ok(raw_json) => {
				ctx.put(self.output_key(), raw_json);
			},
			Err(err) => {
				ctx.add_error(self.name(), format!("summary generation failed: {err}"));
			},
		}
	}
}
