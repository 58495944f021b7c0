use async_trait::async_trait;
use mediasearch_media::GcsObject;
use mediasearch_pipeline::{PipelineContext, Step, StepMeta};

use crate::{keys::GCS_OBJECT_KEY, notification::Notification};

/// JSON-decodes the bus payload under `__IN__` into a [`Notification`],
/// projects it to a [`GcsObject`], and stores that projection under both
/// the domain key and `__OUT__` for the next step.
pub struct ParseNotification {
	meta: StepMeta,
}

impl ParseNotification {
	pub fn new() -> Self {
		Self { meta: StepMeta::new("parse_notification") }
	}
}

impl Default for ParseNotification {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Step for ParseNotification {
	fn meta(&self) -> &StepMeta {
		&self.meta
	}

	async fn execute(&self, ctx: &mut PipelineContext) {
		let raw = match ctx.get::<Vec<u8>>(self.input_key()) {
			Some(bytes) => bytes.clone(),
			None => {
				ctx.add_error(self.name(), "missing raw notification payload under __IN__");
				return;
			},
		};

		let notification: Notification = match serde_json::from_slice(&raw) {
			Ok(notification) => notification,
			Err(err) => {
				ctx.add_error(self.name(), format!("malformed notification JSON: {err}"));
				return;
			},
		};

		let object = GcsObject {
			bucket: notification.bucket,
			name: notification.name,
			mime_type: notification.content_type,
		};
		ctx.put(GCS_OBJECT_KEY, object.clone());
		ctx.put(self.output_key(), object);
	}
}

#[cfg(test)]
mod tests {
	use mediasearch_pipeline::{TraceContext, IN_KEY};
	use tracing::Span;

	use super::*;

	#[tokio::test]
	async fn projects_notification_to_gcs_object() {
		let step = ParseNotification::new();
		let mut ctx = PipelineContext::new();
		ctx.put(
			IN_KEY,
			br#"{"bucket":"media_high_res_resources","name":"test-trailer-001.mp4","contentType":"video/mp4","generation":"1"}"#
				.to_vec(),
		);
		ctx.with_trace_context(TraceContext::root(Span::none()));
		step.execute(&mut ctx).await;
		assert!(!ctx.has_errors());
		let object = ctx.get::<GcsObject>(GCS_OBJECT_KEY).unwrap();
		assert_eq!(object.bucket, "media_high_res_resources");
		assert_eq!(object.name, "test-trailer-001.mp4");
		assert_eq!(object.mime_type, "video/mp4");
	}

	#[tokio::test]
	async fn malformed_json_is_an_error() {
		let step = ParseNotification::new();
		let mut ctx = PipelineContext::new();
		ctx.put(IN_KEY, b"not json".to_vec());
		ctx.with_trace_context(TraceContext::root(Span::none()));
		step.execute(&mut ctx).await;
		assert!(ctx.has_errors());
	}
}
