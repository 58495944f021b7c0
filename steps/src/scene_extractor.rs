use std::sync::Arc;

use async_trait::async_trait;
use mediasearch_common::metrics::{new_counter, IntCounter};
use mediasearch_media::{GcsObject, MediaSummary, Scene};
use mediasearch_modelinvoker::{generate_multimodal, ContentPart, ModelInvoker};
use mediasearch_objectstore::ObjectStore;
use mediasearch_pipeline::{PipelineContext, Step, StepMeta};
use tokio::sync::{mpsc, Mutex};
use tracing::Instrument;

use crate::{
	keys::{GCS_OBJECT_KEY, MEDIA_SUMMARY_KEY, SCENES_KEY},
	prompts,
};

struct Job {
	index: usize,
	sequence: u32,
	start: String,
	end: String,
}

enum JobResult {
	Value(String),
	Error(String),
}

/// Fans out one model call per time span across a bounded worker pool
/// sharing a single [`ModelInvoker`] (and therefore its rate limiter).
/// Worker completion order is not preserved; the assembled scene list is
/// re-sequenced downstream in [`crate::assemble_media::AssembleMedia`].
pub struct SceneExtractor {
	meta: StepMeta,
	invoker: Arc<ModelInvoker>,
	object_store: Arc<dyn ObjectStore>,
	template: String,
	worker_count: usize,
	in_tokens: IntCounter,
	out_tokens: IntCounter,
	retries: IntCounter,
}

impl SceneExtractor {
	pub fn new(
		invoker: Arc<ModelInvoker>,
		object_store: Arc<dyn ObjectStore>,
		template: impl Into<String>,
		worker_count: Option<usize>,
	) -> Self {
		Self {
			meta: StepMeta::new("scene_extractor"),
			invoker,
			object_store,
			template: template.into(),
			worker_count: worker_count.unwrap_or_else(num_cpus::get),
			in_tokens: new_counter("scene_extractor_prompt_tokens_total", "prompt tokens sent by scene_extractor", "mediasearch"),
			out_tokens: new_counter(
				"scene_extractor_candidate_tokens_total",
				"candidate tokens received by scene_extractor",
				"mediasearch",
			),
			retries: new_counter("scene_extractor_retries_total", "retries performed by scene_extractor", "mediasearch"),
		}
	}
}

#[async_trait]
impl Step for SceneExtractor {
	fn meta(&self) -> &StepMeta {
		&self.meta
	}

	async fn execute(&self, ctx: &mut PipelineContext) {
		let summary = match ctx.get::<MediaSummary>(MEDIA_SUMMARY_KEY).cloned() {
			Some(summary) => summary,
			None => {
				ctx.add_error(self.name(), "missing media summary to extract scenes from");
				return;
			},
		};
		let object = match ctx.get::<GcsObject>(GCS_OBJECT_KEY).cloned() {
			Some(object) => object,
			None => {
				ctx.add_error(self.name(), "missing gcs object to extract scenes from");
				return;
			},
		};
		let trace_context = match ctx.trace_context().cloned() {
			Some(trace_context) => trace_context,
			None => {
				ctx.add_error(self.name(), "missing trace context");
				return;
			},
		};

		let time_spans = summary.scene_time_stamps.clone();
		if time_spans.is_empty() {
			ctx.put(SCENES_KEY, Vec::<Scene>::new());
			ctx.put(self.output_key(), Vec::<Scene>::new());
			return;
		}

		let cast_list = summary.cast.iter().map(|member| member.actor_name.as_str()).collect::<Vec<_>>().join(", ");
		let summary_text = format!("{}\n{}\nCast: {}", summary.title, summary.summary, cast_list);
		let file_uri = self.object_store.object_url(&object.bucket, &object.name);

		let capacity = time_spans.len();
		let (job_tx, job_rx) = mpsc::channel::<Job>(capacity);
		let (result_tx, mut result_rx) = mpsc::channel::<JobResult>(capacity);
		let job_rx = Arc::new(Mutex::new(job_rx));

		let worker_count = self.worker_count.min(capacity).max(1);
		let mut workers = Vec::with_capacity(worker_count);
		for _ in 0..worker_count {
			let job_rx = job_rx.clone();
			let result_tx = result_tx.clone();
			let invoker = self.invoker.clone();
			let template = self.template.clone();
			let summary_text = summary_text.clone();
			let file_uri = file_uri.clone();
			let mime_type = object.mime_type.clone();
			let in_tokens = self.in_tokens.clone();
			let out_tokens = self.out_tokens.clone();
			let retries = self.retries.clone();
			let step_name = self.name().to_string();
			let trace_context = trace_context.clone();

			workers.push(tokio::spawn(async move {
				loop {
					let job = {
						let mut rx = job_rx.lock().await;
						rx.recv().await
					};
					let Some(job) = job else { break };

					let span = tracing::info_span!(
						"scene_genai",
						step = %step_name,
						index = job.index,
						sequence = job.sequence,
						start = %job.start,
						end = %job.end,
					);
					let mut call_ctx = PipelineContext::new();
					call_ctx.with_trace_context(trace_context.child_span(span.clone()));

					let outcome = async {
						let vars = prompts::scene_vars(job.sequence, &summary_text, &job.start, &job.end);
						let prompt = match prompts::render(&template, &vars) {
							Ok(prompt) => prompt,
							Err(err) => return JobResult::Error(format!("failed to render scene prompt: {err}")),
						};
						let content = [ContentPart::text(prompt), ContentPart::file(file_uri.clone(), mime_type.clone())];
						match generate_multimodal(&call_ctx, &in_tokens, &out_tokens, &retries, &invoker, &content).await {
							Ok(value) => JobResult::Value(value),
							Err(err) => JobResult::Error(err.to_string()),
						}
					}
					.instrument(span)
					.await;

					if result_tx.send(outcome).await.is_err() {
						break;
					}
				}
			}));
		}

		for (index, span) in time_spans.iter().enumerate() {
			let job = Job { index, sequence: (index + 1) as u32, start: span.start.clone(), end: span.end.clone() };
			if job_tx.send(job).await.is_err() {
				break;
			}
		}
		drop(job_tx);
		drop(result_tx);

		for worker in workers {
			let _ = worker.await;
		}

		let mut scenes = Vec::new();
		while let Some(result) = result_rx.recv().await {
			match result {
				JobResult::Value(value) => {
					let trimmed = value.trim();
					if trimmed.is_empty() || trimmed == "{}" {
						continue;
					}
					match serde_json::from_str::<Scene>(trimmed) {
						Ok(scene) => scenes.push(scene),
						Err(err) => ctx.add_error(self.name(), format!("malformed scene JSON: {err}")),
					}
				},
				JobResult::Error(err) => ctx.add_error(self.name(), err),
			}
		}

		ctx.put(SCENES_KEY, scenes.clone());
		ctx.put(self.output_key(), scenes);
	}
}
