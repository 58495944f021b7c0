use std::sync::{Arc, RwLock};

use google_cloud_pubsub::subscription::Subscription;
use mediasearch_pipeline::{PipelineContext, Step, TraceContext, IN_KEY};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info_span, Instrument};

use crate::error::{ListenerError, ListenerResult};

const PULL_BATCH_SIZE: i32 = 10;

/// Subscribes to a named object-store notification subscription and runs a
/// single attached handler (typically a [`mediasearch_pipeline::Pipeline`])
/// per message. Acknowledges only on success; on any step error the message
/// is left unacked so the subscription's own ack-deadline redelivers it.
pub struct StorageEventListener {
	subscription: Subscription,
	subscription_id: String,
	handler: RwLock<Option<Arc<dyn Step>>>,
}

impl StorageEventListener {
	pub fn new(
		subscription: Subscription,
		subscription_id: impl Into<String>,
		handler: Option<Arc<dyn Step>>,
	) -> Self {
		Self { subscription, subscription_id: subscription_id.into(), handler: RwLock::new(handler) }
	}

	/// Attaches `handler` only if no handler is currently set, to avoid
	/// accidentally overwriting one already in use by a running `listen`
	/// loop.
	pub fn set_handler(&self, handler: Arc<dyn Step>) -> ListenerResult<()> {
		let mut slot = self.handler.write().expect("listener handler lock poisoned");
		if slot.is_some() {
			return Err(ListenerError::handler_already_set());
		}
		*slot = Some(handler);
		Ok(())
	}

	fn handler(&self) -> Option<Arc<dyn Step>> {
		self.handler.read().expect("listener handler lock poisoned").clone()
	}

	/// Launches the receive loop on a background task. The loop terminates
	/// once `trace_context`'s signal is cancelled; messages already pulled
	/// when that happens still run to completion.
	pub fn listen(self: Arc<Self>, trace_context: TraceContext) -> JoinHandle<()> {
		tokio::spawn(async move {
			let pull_cancel = CancellationToken::new();
			let watcher_cancel = pull_cancel.clone();
			let watcher_signal = trace_context.terminate.clone();
			tokio::spawn(async move {
				while watcher_signal.is_alive() {
					tokio::time::sleep(std::time::Duration::from_millis(200)).await;
				}
				watcher_cancel.cancel();
			});

			while !trace_context.is_cancelled() {
				let messages = match self.subscription.pull(PULL_BATCH_SIZE, Some(pull_cancel.clone())).await {
					Ok(messages) => messages,
					Err(err) => {
						error!(subscription = %self.subscription_id, error = ?err, "failed to pull messages");
						continue;
					},
				};

				for message in messages {
					let Some(handler) = self.handler() else {
						error!(subscription = %self.subscription_id, "no handler attached, dropping message");
						continue;
					};

					let span = info_span!("receive-message", subscription = %self.subscription_id);
					let mut ctx = PipelineContext::new();
					ctx.put(IN_KEY, message.message.data.clone());
					ctx.with_trace_context(trace_context.child_span(span.clone()));

					handler.execute(&mut ctx).instrument(span.clone()).await;

					if ctx.has_errors() {
						span.in_scope(|| {
							error!(errors = ?ctx.errors(), "handler completed with errors, leaving message unacked")
						});
					} else if let Err(err) = message.ack().await {
						span.in_scope(|| error!(error = ?err, "failed to ack message"));
					}
				}
			}
		})
	}
}
