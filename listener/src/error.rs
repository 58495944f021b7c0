use std::sync::Arc;

use thiserror::Error;

pub type ListenerResult<T> = Result<T, ListenerError>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListenerErrorKind {
	/// Subscribing to, or pulling from, the subscription failed.
	Connection,
	/// A handler was already attached; `set_handler` never overwrites one.
	HandlerAlreadySet,
}

#[derive(Debug, Clone, Error)]
#[error("listener error (kind={kind:?}, source={source})")]
pub struct ListenerError {
	pub kind: ListenerErrorKind,
	#[source]
	pub source: Arc<anyhow::Error>,
}

impl ListenerError {
	pub fn new(kind: ListenerErrorKind, source: Arc<anyhow::Error>) -> Self {
		ListenerError { kind, source }
	}

	pub fn connection(source: impl Into<anyhow::Error>) -> Self {
		Self::new(ListenerErrorKind::Connection, Arc::new(source.into()))
	}

	pub fn handler_already_set() -> Self {
		Self::new(
			ListenerErrorKind::HandlerAlreadySet,
			Arc::new(anyhow::anyhow!("a handler is already attached to this listener")),
		)
	}
}
