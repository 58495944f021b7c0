use std::{collections::HashMap, path::PathBuf};

use mediasearch_common::{TerimateSignal, ValueBag};
use tracing::{warn, Span};

pub const IN_KEY: &str = "__IN__";
pub const OUT_KEY: &str = "__OUT__";

/// One error reported by a step, kept in the order it was recorded.
#[derive(Debug, Clone)]
pub struct StepError {
	pub step: String,
	pub message: String,
}

/// The ambient tracing/cancellation context a [`PipelineContext`] carries.
///
/// Bundles the current span (for the pipeline's span-swap protocol) with a
/// [`TerimateSignal`] so that cancelling a listener's root signal propagates
/// down through every in-flight pipeline and model call without a second,
/// parallel cancellation mechanism.
#[derive(Clone)]
pub struct TraceContext {
	pub span: Span,
	pub terminate: TerimateSignal,
}

impl TraceContext {
	pub fn root(span: Span) -> Self {
		Self { span, terminate: TerimateSignal::default() }
	}

	pub fn is_cancelled(&self) -> bool {
		self.terminate.is_dead()
	}

	/// Derives a child context sharing the same kill switch but a fresh span.
	pub fn child_span(&self, span: Span) -> Self {
		Self { span, terminate: self.terminate.clone() }
	}
}

/// Shared, per-run state threaded through a [`crate::Pipeline`].
///
/// Not shared across runs: a fresh `PipelineContext` is built for every
/// message a listener receives, and every run gets its own bag, error list
/// and temp-file register.
pub struct PipelineContext {
	bag: ValueBag,
	errors: Vec<StepError>,
	temp_files: Vec<PathBuf>,
	trace_context: Option<TraceContext>,
	closed: bool,
}

impl Default for PipelineContext {
	fn default() -> Self {
		Self::new()
	}
}

impl PipelineContext {
	pub fn new() -> Self {
		Self {
			bag: ValueBag::new(),
			errors: Vec::new(),
			temp_files: Vec::new(),
			trace_context: None,
			closed: false,
		}
	}

	pub fn bag(&self) -> &ValueBag {
		&self.bag
	}

	pub fn put<T: std::any::Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) -> &mut Self {
		self.bag.insert(key, value);
		self
	}

	pub fn get<T: std::any::Any + Send + Sync>(&self, key: &str) -> Option<&T> {
		self.bag.get(key)
	}

	pub fn get_mut<T: std::any::Any + Send + Sync>(&mut self, key: &str) -> Option<&mut T> {
		self.bag.get_mut(key)
	}

	pub fn remove<T: std::any::Any + Send + Sync>(&mut self, key: &str) -> Option<T> {
		self.bag.remove(key)
	}

	/// Moves the value under `key` out without needing to know its type.
	pub fn take_any(&mut self, key: &str) -> Option<Box<dyn std::any::Any + Send + Sync>> {
		self.bag.take_any(key)
	}

	/// Inserts an already-boxed value under `key`.
	pub fn put_any(&mut self, key: impl Into<String>, value: Box<dyn std::any::Any + Send + Sync>) {
		self.bag.put_any(key, value);
	}

	pub fn add_error(&mut self, step_name: impl Into<String>, err: impl std::fmt::Display) {
		self.errors.push(StepError { step: step_name.into(), message: err.to_string() });
	}

	/// Errors recorded so far, grouped by the step that reported them. Order
	/// within a step's list matches the order errors were recorded.
	pub fn errors(&self) -> HashMap<String, Vec<String>> {
		let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
		for error in &self.errors {
			grouped.entry(error.step.clone()).or_default().push(error.message.clone());
		}
		grouped
	}

	/// The raw, insertion-ordered error list.
	pub fn errors_ordered(&self) -> &[StepError] {
		&self.errors
	}

	pub fn has_errors(&self) -> bool {
		!self.errors.is_empty()
	}

	pub fn track_temp(&mut self, path: impl Into<PathBuf>) {
		self.temp_files.push(path.into());
	}

	pub fn temp_files(&self) -> &[PathBuf] {
		&self.temp_files
	}

	pub fn with_trace_context(&mut self, trace_context: TraceContext) -> &mut Self {
		self.trace_context = Some(trace_context);
		self
	}

	pub fn trace_context(&self) -> Option<&TraceContext> {
		self.trace_context.as_ref()
	}

	pub fn is_cancelled(&self) -> bool {
		self.trace_context.as_ref().map(TraceContext::is_cancelled).unwrap_or(false)
	}

	/// Best-effort delete of every tracked temp file. Idempotent: a second
	/// call is a no-op. A single file's delete failure is logged and does
	/// not stop cleanup of the rest.
	pub fn close(&mut self) {
		if self.closed {
			return;
		}
		self.closed = true;
		for path in self.temp_files.drain(..) {
			if let Err(err) = std::fs::remove_file(&path) {
				if err.kind() != std::io::ErrorKind::NotFound {
					warn!(path = %path.display(), error = %err, "failed to remove tracked temp file");
				}
			}
		}
	}
}

impl Drop for PipelineContext {
	fn drop(&mut self) {
		self.close();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn put_get_roundtrip() {
		let mut ctx = PipelineContext::new();
		ctx.put(IN_KEY, String::from("hello"));
		assert_eq!(ctx.get::<String>(IN_KEY), Some(&"hello".to_string()));
	}

	#[test]
	fn errors_group_by_step() {
		let mut ctx = PipelineContext::new();
		assert!(!ctx.has_errors());
		ctx.add_error("parse_notification", "bad json");
		ctx.add_error("parse_notification", "missing bucket");
		ctx.add_error("persist_media", "insert failed");
		let grouped = ctx.errors();
		assert_eq!(grouped.get("parse_notification").unwrap().len(), 2);
		assert_eq!(grouped.get("persist_media").unwrap().len(), 1);
		assert!(ctx.has_errors());
	}

	#[test]
	fn close_is_idempotent() {
		let dir = std::env::temp_dir().join(format!("mediasearch-ctx-test-{}", uuid::Uuid::new_v4()));
		std::fs::write(&dir, b"x").unwrap();
		let mut ctx = PipelineContext::new();
		ctx.track_temp(dir.clone());
		ctx.close();
		assert!(!dir.exists());
		ctx.close();
	}

	#[test]
	fn cancellation_propagates_from_parent_signal() {
		let mut ctx = PipelineContext::new();
		let root = TraceContext::root(Span::none());
		assert!(!ctx.is_cancelled());
		let child = root.child_span(Span::none());
		ctx.with_trace_context(child);
		assert!(!ctx.is_cancelled());
		root.terminate.kill();
		assert!(ctx.is_cancelled());
	}
}
