use serde::{Deserialize, Serialize};

/// The `columnar.{dataset, media_table, embedding_table}` configuration
/// block. The project id used to qualify these table names is
/// `application.project_id`, not a field here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnarStoreConfig {
	pub dataset: String,
	pub media_table: String,
	pub embedding_table: String,
}

impl ColumnarStoreConfig {
	pub fn media_table_id(&self, project_id: &str) -> String {
		format!("{}.{}.{}", project_id, self.dataset, self.media_table)
	}

	pub fn embedding_table_id(&self, project_id: &str) -> String {
		format!("{}.{}.{}", project_id, self.dataset, self.embedding_table)
	}
}
