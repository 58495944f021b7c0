use std::{num::NonZeroU32, sync::Arc};

use clap::{ArgMatches, Command};
use google_cloud_pubsub::client::{Client as PubsubClient, ClientConfig as PubsubClientConfig};
use mediasearch_media::CategoryRegistry;
use mediasearch_modelinvoker::{EmbeddingInvoker, GenerationConfig, ModelInvoker, VertexAiClient};
use mediasearch_objectstore::{GcsCredentials, GcsObjectStore, ObjectStore};
use mediasearch_listener::StorageEventListener;
use mediasearch_pipeline::TraceContext;
use mediasearch_steps::external_transcode::TranscodeConfig;
use mediasearch_storage::{BigQueryColumnarStore, ColumnarStore};
use mediasearch_workflows::{analyze_workflow, embed_worker::EmbedWorker, resize_workflow, AnalyzeWorkflowConfig, ListenerSupervisor};
use mediasearch_config::load_app_config;
use tokio::signal;
use tracing::{debug, info};

use crate::config_cli_arg;

pub fn build_serve_command() -> Command {
	Command::new("serve")
		.about("Starts a media search node.")
		.long_about("Starts a media search node with the resize/analyze listeners and the embed worker enabled.")
		.arg(config_cli_arg())
}

#[derive(Debug, Eq, PartialEq)]
pub struct Serve {
	config_uri: String,
}

/// Flags whether the runtime's thread pool spent longer than expected
/// between parking a worker thread and the next task being picked up,
/// which usually means every worker is saturated.
pub mod busy_detector {
	use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
	use std::time::Instant;

	use once_cell::sync::Lazy;
	use tracing::debug;

	static TIME_REF: Lazy<Instant> = Lazy::new(Instant::now);
	static ENABLED: AtomicBool = AtomicBool::new(false);

	const ALLOWED_DELAY_MICROS: u64 = 5000;
	const DEBUG_SUPPRESSION_MICROS: u64 = 30_000_000;

	thread_local!(static LAST_UNPARK_TIMESTAMP: AtomicU64 = AtomicU64::new(0));
	static NEXT_DEBUG_TIMESTAMP: AtomicU64 = AtomicU64::new(0);
	static SUPPRESSED_DEBUG_COUNT: AtomicU64 = AtomicU64::new(0);

	pub fn set_enabled(enabled: bool) {
		ENABLED.store(enabled, Ordering::Relaxed);
	}

	pub fn thread_unpark() {
		LAST_UNPARK_TIMESTAMP.with(|time| {
			let now = Instant::now().checked_duration_since(*TIME_REF).unwrap_or_default();
			time.store(now.as_micros() as u64, Ordering::Relaxed);
		})
	}

	pub fn thread_park() {
		if !ENABLED.load(Ordering::Relaxed) {
			return;
		}

		LAST_UNPARK_TIMESTAMP.with(|time| {
			let now = Instant::now().checked_duration_since(*TIME_REF).unwrap_or_default();
			let now = now.as_micros() as u64;
			let delta = now - time.load(Ordering::Relaxed);
			if delta > ALLOWED_DELAY_MICROS {
				emit_debug(delta, now);
			}
		})
	}

	fn emit_debug(delta: u64, now: u64) {
		if NEXT_DEBUG_TIMESTAMP
			.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next_debug| {
				if next_debug < now { Some(now + DEBUG_SUPPRESSION_MICROS) } else { None }
			})
			.is_err()
		{
			SUPPRESSED_DEBUG_COUNT.fetch_add(1, Ordering::Relaxed);
			return;
		}

		let suppressed = SUPPRESSED_DEBUG_COUNT.swap(0, Ordering::Relaxed);
		if suppressed == 0 {
			debug!("thread wasn't parked for {delta}µs, is the runtime too busy?");
		} else {
			debug!("thread wasn't parked for {delta}µs, is the runtime too busy? ({suppressed} similar messages suppressed)");
		}
	}
}

impl Serve {
	pub fn parse_cli_args(mut matches: ArgMatches) -> anyhow::Result<Self> {
		let config_uri = matches.try_remove_one::<String>("config").unwrap_or_default();
		Ok(Serve { config_uri: config_uri.unwrap_or_default() })
	}

	pub async fn execute(&self) -> anyhow::Result<()> {
		debug!(args = ?self, "run-mediasearch-service");
		busy_detector::set_enabled(true);
		let config = load_app_config(&self.config_uri).await?;

		let service_account_key = std::env::var("MEDIASEARCH_SERVICE_ACCOUNT_KEY_PATH")
			.ok()
			.map(tokio::fs::read_to_string);
		let credentials = match service_account_key {
			Some(read) => GcsCredentials(read.await?),
			None => GcsCredentials(String::new()),
		};
		let object_store: Arc<dyn ObjectStore> = Arc::new(GcsObjectStore::new(&config.storage, &credentials)?);

		let bigquery_client = gcp_bigquery_client::Client::from_service_account_key_file(
			&std::env::var("MEDIASEARCH_SERVICE_ACCOUNT_KEY_PATH").unwrap_or_default(),
		)
		.await?;
		let columnar_store: Arc<dyn ColumnarStore> =
			Arc::new(BigQueryColumnarStore::new(bigquery_client, config.application.project_id.clone(), config.columnar.clone()));

		let categories = Arc::new(CategoryRegistry::new(config.categories.clone()));
		let access_token = std::env::var("MEDIASEARCH_VERTEX_ACCESS_TOKEN").unwrap_or_default();
		let vertex = Arc::new(VertexAiClient::new(config.application.project_id.clone(), config.application.location.clone(), access_token));

		let trace_context = TraceContext::root(tracing::info_span!("mediasearch-node"));

		let transcode_config = TranscodeConfig {
			binary: std::env::var("MEDIASEARCH_FFMPEG_BINARY").unwrap_or_else(|_| "ffmpeg".to_string()),
			width: 640,
			lo_res_bucket: config.storage.lo_res_bucket.clone(),
		};
		let resize_pipeline = Arc::new(resize_workflow::build(object_store.clone(), transcode_config));

		let summary_model = config
			.agent_models
			.get("summary")
			.ok_or_else(|| anyhow::anyhow!("missing `agent_models.summary` configuration"))?;
		let scene_model = config
			.agent_models
			.get("scene")
			.ok_or_else(|| anyhow::anyhow!("missing `agent_models.scene` configuration"))?;
		let summary_invoker = Arc::new(ModelInvoker::new(
			summary_model.model.clone(),
			agent_generation_config(summary_model),
			NonZeroU32::new(summary_model.rate_limit.max(1)).unwrap(),
			vertex.clone(),
		));
		let scene_invoker = Arc::new(ModelInvoker::new(
			scene_model.model.clone(),
			agent_generation_config(scene_model),
			NonZeroU32::new(scene_model.rate_limit.max(1)).unwrap(),
			vertex.clone(),
		));
		let analyze_pipeline = Arc::new(analyze_workflow::build(
			object_store.clone(),
			summary_invoker,
			scene_invoker,
			categories,
			columnar_store.clone(),
			AnalyzeWorkflowConfig {
				summary_template: config.prompts.summary.clone(),
				scene_template: config.prompts.scene.clone(),
				worker_count: None,
			},
		));

		let mut supervisor = ListenerSupervisor::new(trace_context.clone());
		let pubsub_client = PubsubClient::new(PubsubClientConfig::default().with_auth().await?).await?;
		for (logical, subscription_config) in &config.subscriptions {
			let subscription = pubsub_client.subscription(&subscription_config.name);
			let pipeline: Arc<dyn mediasearch_pipeline::Step> = match logical.as_str() {
				"resize" => resize_pipeline.clone(),
				"analyze" => analyze_pipeline.clone(),
				other => {
					info!(subscription = %other, "no workflow configured for this subscription, skipping");
					continue;
				},
			};
			let listener = Arc::new(StorageEventListener::new(subscription, subscription_config.name.clone(), Some(pipeline)));
			supervisor.add_listener(listener.listen(trace_context.clone()));
		}

		let embed_model = config
			.embedding_models
			.get("scene")
			.ok_or_else(|| anyhow::anyhow!("missing `embedding_models.scene` configuration"))?;
		let embedder = Arc::new(EmbeddingInvoker::new(
			embed_model.model.clone(),
			NonZeroU32::new(embed_model.max_requests_per_minute.max(1)).unwrap(),
			vertex,
		));
		let embed_worker = Arc::new(EmbedWorker::new(columnar_store, embedder));
		supervisor.set_embed_worker(embed_worker.run(trace_context.clone()));

		info!("media search node is listening");
		signal::ctrl_c().await.expect("registering a signal handler for SIGINT should not fail");
		info!("shutdown signal received, draining in-flight work");
		supervisor.shutdown().await;

		info!("media search node has shut down");
		Ok(())
	}
}

fn agent_generation_config(model: &mediasearch_config::AgentModelConfig) -> GenerationConfig {
	GenerationConfig {
		temperature: model.temperature,
		top_p: model.top_p,
		top_k: model.top_k,
		max_output_tokens: model.max_tokens,
		safety_settings: Vec::new(),
		system_instruction: model.system_instructions.clone(),
		response_mime_type: model.output_format.clone(),
	}
}
