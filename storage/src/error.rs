use std::sync::Arc;

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage error kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StorageErrorKind {
	/// The target row/table does not exist.
	NotFound,
	/// The request credentials do not allow for this operation.
	Unauthorized,
	/// A streaming insert or query failed against the backend.
	Query,
	/// A generic internal error (serialization, malformed row, etc).
	Internal,
}

/// Generic storage error, `kind` plus a preserved `anyhow` source.
#[derive(Debug, Clone, Error)]
#[error("storage error (kind={kind:?}, source={source})")]
pub struct StorageError {
	pub kind: StorageErrorKind,
	#[source]
	pub source: Arc<anyhow::Error>,
}

impl StorageError {
	pub fn new(kind: StorageErrorKind, source: Arc<anyhow::Error>) -> Self {
		StorageError { kind, source }
	}

	pub fn query(source: impl Into<anyhow::Error>) -> Self {
		Self::new(StorageErrorKind::Query, Arc::new(source.into()))
	}

	pub fn internal(msg: impl std::fmt::Display) -> Self {
		Self::new(StorageErrorKind::Internal, Arc::new(anyhow::anyhow!("{msg}")))
	}

	pub fn add_context<C>(self, ctx: C) -> Self
	where
		C: std::fmt::Display + Send + Sync + 'static,
	{
		StorageError { kind: self.kind, source: Arc::new(anyhow::anyhow!("{ctx}").context(self.source)) }
	}

	pub fn kind(&self) -> StorageErrorKind {
		self.kind
	}
}
