use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model error kind.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ModelErrorKind {
	/// The call itself failed (transport error, non-2xx status, malformed body).
	Call,
	/// The model returned a response this crate could not parse into the
	/// expected shape (e.g. no text parts in any candidate).
	InvalidResponse,
	/// `generate`'s 60-second failure-retry budget, or
	/// `generate_multimodal`'s try-count budget, was exhausted.
	MaxRetriesExceeded,
}

/// A generic error type for model operations, encapsulating an error kind
/// and its source.
#[derive(Debug, Clone, Error)]
#[error("model error (kind={kind:?}, source={source})")]
pub struct ModelError {
	pub kind: ModelErrorKind,
	#[source]
	pub source: Arc<anyhow::Error>,
}

pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
	pub fn new(kind: ModelErrorKind, source: Arc<anyhow::Error>) -> Self {
		ModelError { kind, source }
	}

	pub fn call(source: impl Into<anyhow::Error>) -> Self {
		Self::new(ModelErrorKind::Call, Arc::new(source.into()))
	}

	pub fn invalid_response(msg: impl fmt::Display) -> Self {
		Self::new(ModelErrorKind::InvalidResponse, Arc::new(anyhow::anyhow!("{msg}")))
	}

	pub fn add_context<C>(self, ctx: C) -> Self
	where
		C: fmt::Display + Send + Sync + 'static,
	{
		ModelError { kind: self.kind, source: Arc::new(anyhow::anyhow!("{ctx}").context(self.source)) }
	}

	pub fn kind(&self) -> ModelErrorKind {
		self.kind.clone()
	}
}

impl From<reqwest::Error> for ModelError {
	fn from(err: reqwest::Error) -> ModelError {
		ModelError::new(ModelErrorKind::Call, Arc::new(err.into()))
	}
}

impl From<serde_json::Error> for ModelError {
	fn from(err: serde_json::Error) -> ModelError {
		ModelError::new(ModelErrorKind::InvalidResponse, Arc::new(err.into()))
	}
}
