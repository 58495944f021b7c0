use std::sync::Arc;

use async_trait::async_trait;
use mediasearch_media::GcsObject;
use mediasearch_objectstore::ObjectStore;
use mediasearch_pipeline::{PipelineContext, Step, StepMeta};
use tokio::process::Command;

use crate::keys::{GCS_OBJECT_KEY, LO_RES_OBJECT_KEY};

/// Transcoder invocation settings: the external binary to shell out to and
/// the target frame width. Height is derived to preserve aspect ratio and
/// rounded down to an even number, the constraint most transcoders impose
/// on their video filter chains.
#[derive(Debug, Clone)]
pub struct TranscodeConfig {
	pub binary: String,
	pub width: u32,
	pub lo_res_bucket: String,
}

impl TranscodeConfig {
	fn scale_filter(&self) -> String {
		format!("scale=w={}:h=trunc(ow/a/2)*2", self.width)
	}
}

/// Runs an external transcoder process over the hi-res object (read
/// directly from the filesystem mount when configured, otherwise
/// downloaded to a tracked temp file), uploading the scaled result to the
/// lo-res bucket under the same object name.
pub struct ExternalTranscode {
	meta: StepMeta,
	object_store: Arc<dyn ObjectStore>,
	config: TranscodeConfig,
}

impl ExternalTranscode {
	pub fn new(object_store: Arc<dyn ObjectStore>, config: TranscodeConfig) -> Self {
		Self { meta: StepMeta::new("external_transcode"), object_store, config }
	}

	/// Resolves the hi-res object to a local path, reporting whether that
	/// path is a temp copy this step downloaded (and therefore owns) or the
	/// filesystem mount's own path to the source object, which must never be
	/// deleted.
	async fn resolve_input_path(&self, object: &GcsObject) -> Result<(std::path::PathBuf, bool), String> {
		if let Some(path) = self.object_store.mounted_path(&object.bucket, &object.name) {
			return Ok((path, false));
		}
		let temp_path = std::env::temp_dir().join(format!("{}-hi-res-{}", self.meta.name, object.name));
		self.object_store
			.copy_to_path(&object.bucket, &object.name, &temp_path)
			.await
			.map_err(|err| err.to_string())?;
		Ok((temp_path, true))
	}
}

#[async_trait]
impl Step for ExternalTranscode {
	fn meta(&self) -> &StepMeta {
		&self.meta
	}

	async fn execute(&self, ctx: &mut PipelineContext) {
		let object = match ctx.get::<GcsObject>(GCS_OBJECT_KEY).cloned() {
			Some(object) => object,
			None => {
				ctx.add_error(self.name(), "missing gcs object to transcode");
				return;
			},
		};

		let (input_path, owned) = match self.resolve_input_path(&object).await {
			Ok(resolved) => resolved,
			Err(err) => {
				ctx.add_error(self.name(), format!("failed to resolve transcoder input: {err}"));
				return;
			},
		};
		if owned {
			ctx.track_temp(input_path.clone());
		}

		let output_path = std::env::temp_dir().join(format!("{}-lo-res-{}", self.meta.name, object.name));
		ctx.track_temp(output_path.clone());

		let status = Command::new(&self.config.binary)
			.arg("-i")
			.arg(&input_path)
			.arg("-vf")
			.arg(self.config.scale_filter())
			.arg(&output_path)
			.status()
			.await;

		let status = match status {
			Ok(status) => status,
			Err(err) => {
				ctx.add_error(self.name(), format!("failed to spawn transcoder: {err}"));
				return;
			},
		};
		if !status.success() {
			ctx.add_error(self.name(), format!("transcoder exited with {status}"));
			return;
		}

		let output_bytes = match tokio::fs::read(&output_path).await {
			Ok(bytes) => bytes,
			Err(err) => {
				ctx.add_error(self.name(), format!("failed to read transcoder output: {err}"));
				return;
			},
		};
		if let Err(err) = self
			.object_store
			.put_object(&self.config.lo_res_bucket, &object.name, output_bytes, &object.mime_type)
			.await
		{
			ctx.add_error(self.name(), format!("failed to upload transcoded object: {err}"));
			return;
		}

		let output_object =
			GcsObject { bucket: self.config.lo_res_bucket.clone(), name: object.name, mime_type: object.mime_type };
		ctx.put(LO_RES_OBJECT_KEY, output_object.clone());
		ctx.put(self.output_key(), output_object);
	}
}
