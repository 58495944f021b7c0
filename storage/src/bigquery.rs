use std::sync::Arc;

use async_trait::async_trait;
use gcp_bigquery_client::{
	model::{query_request::QueryRequest, table_data_insert_all_request::TableDataInsertAllRequest},
	Client,
};
use mediasearch_media::{CastMember, Media, Rating, Scene, SceneEmbedding};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
	config::ColumnarStoreConfig,
	error::{StorageError, StorageResult},
	store::{ColumnarStore, SceneMatch},
};

/// Wire row for the `media` table: a flat, BigQuery-friendly projection of
/// [`Media`]. `rating` is serialized as its display string since BigQuery
/// has no enum column type.
#[derive(Debug, Serialize, Deserialize)]
struct MediaRow {
	id: String,
	title: String,
	category: String,
	summary: String,
	length_seconds: u32,
	media_url: String,
	director: String,
	release_year: u32,
	genre: String,
	rating: String,
	cast: Vec<CastMember>,
	scenes: Vec<Scene>,
	create_date: String,
}

impl From<&Media> for MediaRow {
	fn from(media: &Media) -> Self {
		MediaRow {
			id: media.id.to_string(),
			title: media.title.clone(),
			category: media.category.clone(),
			summary: media.summary.clone(),
			length_seconds: media.length_seconds,
			media_url: media.media_url.clone(),
			director: media.director.clone(),
			release_year: media.release_year,
			genre: media.genre.clone(),
			rating: media.rating.as_str().to_string(),
			cast: media.cast.clone(),
			scenes: media.scenes.clone(),
			create_date: media.create_date.to_rfc3339(),
		}
	}
}

#[derive(Debug, Serialize, Deserialize)]
struct EmbeddingRow {
	media_id: String,
	sequence_number: u32,
	model_name: String,
	embeddings: Vec<f64>,
}

impl From<&SceneEmbedding> for EmbeddingRow {
	fn from(embedding: &SceneEmbedding) -> Self {
		EmbeddingRow {
			media_id: embedding.media_id.to_string(),
			sequence_number: embedding.sequence,
			model_name: embedding.model_name.clone(),
			embeddings: embedding.embeddings.clone(),
		}
	}
}

/// The BigQuery-backed [`ColumnarStore`]: `media`/`scene_embeddings` rows go
/// in via streaming insert, reads and the VECTOR_SEARCH composition go
/// through the query job API.
pub struct BigQueryColumnarStore {
	client: Arc<Client>,
	project_id: String,
	config: ColumnarStoreConfig,
}

impl BigQueryColumnarStore {
	pub fn new(client: Client, project_id: String, config: ColumnarStoreConfig) -> Self {
		Self { client: Arc::new(client), project_id, config }
	}

	async fn query_rows<T: for<'de> Deserialize<'de>>(&self, sql: &str) -> StorageResult<Vec<T>> {
		let mut result = self
			.client
			.job()
			.query(&self.project_id, QueryRequest::new(sql))
			.await
			.map_err(StorageError::query)?;
		let mut rows = Vec::new();
		while result.next_row() {
			let row: T = result
				.get_serde_result()
				.ok_or_else(|| StorageError::internal("query row missing serde projection"))?
				.map_err(StorageError::query)?;
			rows.push(row);
		}
		Ok(rows)
	}
}

#[async_trait]
impl ColumnarStore for BigQueryColumnarStore {
	async fn check_connectivity(&self) -> StorageResult<()> {
		self.client
			.dataset()
			.get(&self.project_id, &self.config.dataset)
			.await
			.map_err(StorageError::query)?;
		Ok(())
	}

	async fn insert_media(&self, media: &Media) -> StorageResult<()> {
		let mut request = TableDataInsertAllRequest::new();
		request.add_row(Some(media.id.to_string()), MediaRow::from(media)).map_err(StorageError::internal)?;
		self.client
			.tabledata()
			.insert_all(&self.project_id, &self.config.dataset, &self.config.media_table, request)
			.await
			.map_err(StorageError::query)?;
		Ok(())
	}

	async fn get_media(&self, id: Uuid) -> StorageResult<Option<Media>> {
		let sql = format!(
			"SELECT * FROM `{}` WHERE id = '{id}'",
			self.config.media_table_id(&self.project_id)
		);
		let rows: Vec<MediaRow> = self.query_rows(&sql).await?;
		rows.into_iter().next().map(media_row_into_media).transpose()
	}

	async fn get_scene(&self, id: Uuid, sequence: u32) -> StorageResult<Option<Scene>> {
		let sql = format!(
			"SELECT s.sequence, s.start, s.end, s.script FROM `{}`, UNNEST(scenes) s WHERE id = '{id}' AND s.sequence = {sequence}",
			self.config.media_table_id(&self.project_id)
		);
		let rows: Vec<Scene> = self.query_rows(&sql).await?;
		Ok(rows.into_iter().next())
	}

	async fn media_without_embeddings(&self) -> StorageResult<Vec<Media>> {
		let sql = format!(
			"SELECT * FROM `{}` WHERE id NOT IN (SELECT media_id FROM `{}`)",
			self.config.media_table_id(&self.project_id),
			self.config.embedding_table_id(&self.project_id)
		);
		let rows: Vec<MediaRow> = self.query_rows(&sql).await?;
		rows.into_iter().map(media_row_into_media).collect()
	}

	async fn insert_scene_embeddings(&self, embeddings: &[SceneEmbedding]) -> StorageResult<()> {
		let mut request = TableDataInsertAllRequest::new();
		for embedding in embeddings {
			request
				.add_row(None, EmbeddingRow::from(embedding))
				.map_err(StorageError::internal)?;
		}
		self.client
			.tabledata()
			.insert_all(&self.project_id, &self.config.dataset, &self.config.embedding_table, request)
			.await
			.map_err(StorageError::query)?;
		Ok(())
	}

	async fn vector_search(&self, query_embedding: &[f64], top_k: u32) -> StorageResult<Vec<SceneMatch>> {
		let embed = query_embedding.iter().map(f64::to_string).collect::<Vec<_>>().join(", ");
		let sql = format!(
			"SELECT base.media_id, base.sequence_number FROM VECTOR_SEARCH(TABLE `{}`, 'embeddings', (SELECT [{embed}] as embed), top_k => {top_k}, distance_type => 'EUCLIDEAN') ORDER BY distance asc",
			self.config.embedding_table_id(&self.project_id)
		);
		#[derive(Deserialize)]
		struct MatchRow {
			media_id: String,
			sequence_number: u32,
		}
		let rows: Vec<MatchRow> = self.query_rows(&sql).await?;
		rows.into_iter()
			.map(|row| {
				let media_id = Uuid::parse_str(&row.media_id).map_err(StorageError::internal)?;
				Ok(SceneMatch { media_id, sequence: row.sequence_number })
			})
			.collect()
	}
}

fn media_row_into_media(row: MediaRow) -> StorageResult<Media> {
	Ok(Media {
		id: Uuid::parse_str(&row.id).map_err(StorageError::internal)?,
		title: row.title,
		category: row.category,
		summary: row.summary,
		length_seconds: row.length_seconds,
		media_url: row.media_url,
		director: row.director,
		release_year: row.release_year,
		genre: row.genre,
		rating: rating_from_str(&row.rating)?,
		cast: row.cast,
		scenes: row.scenes,
		create_date: chrono::DateTime::parse_from_rfc3339(&row.create_date)
			.map_err(StorageError::internal)?
			.with_timezone(&chrono::Utc),
	})
}

fn rating_from_str(value: &str) -> StorageResult<Rating> {
	match value {
		"G" => Ok(Rating::G),
		"PG" => Ok(Rating::Pg),
		"PG-13" => Ok(Rating::Pg13),
		"R" => Ok(Rating::R),
		"NC-17" => Ok(Rating::Nc17),
		other => Err(StorageError::internal(format!("unknown rating '{other}'"))),
	}
}
