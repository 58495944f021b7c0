pub mod bigquery;
pub use bigquery::BigQueryColumnarStore;
pub mod config;
pub use config::ColumnarStoreConfig;
pub mod error;
pub use error::{StorageError, StorageErrorKind, StorageResult};
pub mod store;
pub use store::{ColumnarStore, SceneMatch};
