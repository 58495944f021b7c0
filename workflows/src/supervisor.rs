use async_trait::async_trait;
use mediasearch_pipeline::TraceContext;
use tokio::task::JoinHandle;
use tracing::info;

/// A liveness check an external process can poll. Deliberately not a
/// working HTTP server: wiring this trait to an actual `/healthz` endpoint
/// is left to whatever HTTP layer wraps the core.
#[async_trait]
pub trait Healthz {
	async fn healthy(&self) -> bool;
}

/// Owns every background task a node process starts (one per configured
/// subscription listener, plus the embed worker) so the binary entry point
/// has a single thing to shut down on Ctrl-C.
pub struct ListenerSupervisor {
	trace_context: TraceContext,
	listener_handles: Vec<JoinHandle<()>>,
	embed_handle: Option<JoinHandle<()>>,
}

impl ListenerSupervisor {
	pub fn new(trace_context: TraceContext) -> Self {
		Self { trace_context, listener_handles: Vec::new(), embed_handle: None }
	}

	pub fn add_listener(&mut self, handle: JoinHandle<()>) {
		self.listener_handles.push(handle);
	}

	pub fn set_embed_worker(&mut self, handle: JoinHandle<()>) {
		self.embed_handle = Some(handle);
	}

	/// Kills the shared cancellation signal and waits for every owned task
	/// to observe it and return. A task that already finished (e.g. panicked)
	/// is joined without error; its `JoinError` is logged, not propagated.
	pub async fn shutdown(mut self) {
		self.trace_context.terminate.kill();
		for handle in self.listener_handles.drain(..) {
			if let Err(err) = handle.await {
				tracing::warn!(error = %err, "listener task did not shut down cleanly");
			}
		}
		if let Some(handle) = self.embed_handle.take() {
			if let Err(err) = handle.await {
				tracing::warn!(error = %err, "embed worker task did not shut down cleanly");
			}
		}
		info!("all supervised tasks have shut down");
	}
}

#[async_trait]
impl Healthz for ListenerSupervisor {
	/// Alive as long as every supervised task is still running; a task that
	/// finished early (crashed or returned) before shutdown was requested
	/// marks the whole node unhealthy.
	async fn healthy(&self) -> bool {
		if self.trace_context.is_cancelled() {
			return false;
		}
		self.listener_handles.iter().all(|handle| !handle.is_finished())
			&& self.embed_handle.as_ref().map(|handle| !handle.is_finished()).unwrap_or(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tracing::Span;

	#[tokio::test]
	async fn healthy_while_tasks_are_running_unhealthy_once_cancelled() {
		let trace_context = TraceContext::root(Span::none());
		let mut supervisor = ListenerSupervisor::new(trace_context.clone());
		let inner_trace_context = trace_context.clone();
		supervisor.add_listener(tokio::spawn(async move {
			while !inner_trace_context.is_cancelled() {
				tokio::time::sleep(std::time::Duration::from_millis(10)).await;
			}
		}));

		assert!(supervisor.healthy().await);
		supervisor.shutdown().await;
	}
}
