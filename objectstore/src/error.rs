use std::sync::Arc;

use thiserror::Error;

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

/// Object store error kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ObjectStoreErrorKind {
	NotFound,
	Unauthorized,
	NotSupported,
	Connection,
	Io,
}

#[derive(Debug, Clone, Error)]
#[error("object store error (kind={kind:?}, source={source})")]
pub struct ObjectStoreError {
	pub kind: ObjectStoreErrorKind,
	#[source]
	pub source: Arc<anyhow::Error>,
}

impl ObjectStoreError {
	pub fn new(kind: ObjectStoreErrorKind, source: Arc<anyhow::Error>) -> Self {
		ObjectStoreError { kind, source }
	}

	pub fn not_found(msg: impl std::fmt::Display) -> Self {
		Self::new(ObjectStoreErrorKind::NotFound, Arc::new(anyhow::anyhow!("{msg}")))
	}

	pub fn io(err: impl Into<anyhow::Error>) -> Self {
		Self::new(ObjectStoreErrorKind::Io, Arc::new(err.into()))
	}
}

impl From<std::io::Error> for ObjectStoreError {
	fn from(err: std::io::Error) -> Self {
		let kind = match err.kind() {
			std::io::ErrorKind::NotFound => ObjectStoreErrorKind::NotFound,
			std::io::ErrorKind::PermissionDenied => ObjectStoreErrorKind::Unauthorized,
			_ => ObjectStoreErrorKind::Io,
		};
		ObjectStoreError::new(kind, Arc::new(err.into()))
	}
}

impl From<opendal::Error> for ObjectStoreError {
	fn from(err: opendal::Error) -> Self {
		let kind = match err.kind() {
			opendal::ErrorKind::NotFound => ObjectStoreErrorKind::NotFound,
			opendal::ErrorKind::PermissionDenied => ObjectStoreErrorKind::Unauthorized,
			opendal::ErrorKind::ConfigInvalid => ObjectStoreErrorKind::NotSupported,
			_ => ObjectStoreErrorKind::Connection,
		};
		ObjectStoreError::new(kind, Arc::new(anyhow::anyhow!("opendal error: {err:?}")))
	}
}
