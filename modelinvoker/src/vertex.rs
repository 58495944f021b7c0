use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
	error::{ModelError, ModelResult},
	generative::{Candidate, ContentPart, EmbeddingModel, GenerateResponse, GenerationConfig, GenerativeModel, TokenUsage},
};

/// A Vertex AI-backed [`GenerativeModel`]/[`EmbeddingModel`] pair, talking
/// to the `generateContent`/`predict` REST endpoints over a shared
/// `reqwest::Client` and a bearer token refreshed by the caller.
#[derive(Clone)]
pub struct VertexAiClient {
	http: Client,
	project_id: String,
	location: String,
	access_token: String,
}

impl VertexAiClient {
	pub fn new(project_id: impl Into<String>, location: impl Into<String>, access_token: impl Into<String>) -> Self {
		Self { http: Client::new(), project_id: project_id.into(), location: location.into(), access_token: access_token.into() }
	}

	fn generate_url(&self, model: &str) -> String {
		format!(
			"https://{loc}-aiplatform.googleapis.com/v1/projects/{proj}/locations/{loc}/publishers/google/models/{model}:generateContent",
			loc = self.location,
			proj = self.project_id,
			model = model,
		)
	}

	fn embed_url(&self, model: &str) -> String {
		format!(
			"https://{loc}-aiplatform.googleapis.com/v1/projects/{proj}/locations/{loc}/publishers/google/models/{model}:predict",
			loc = self.location,
			proj = self.project_id,
			model = model,
		)
	}
}

#[derive(Serialize)]
struct GenerateRequest {
	contents: Vec<GenerateContent>,
	#[serde(rename = "generationConfig")]
	generation_config: VertexGenerationConfig,
	#[serde(rename = "safetySettings")]
	safety_settings: Vec<VertexSafetySetting>,
	#[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
	system_instruction: Option<GenerateContent>,
}

#[derive(Serialize)]
struct GenerateContent {
	role: &'static str,
	parts: Vec<VertexPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum VertexPart {
	Text { text: String },
	FileData { #[serde(rename = "fileData")] file_data: VertexFileData },
}

#[derive(Serialize)]
struct VertexFileData {
	#[serde(rename = "mimeType")]
	mime_type: String,
	#[serde(rename = "fileUri")]
	file_uri: String,
}

#[derive(Serialize)]
struct VertexGenerationConfig {
	temperature: f32,
	#[serde(rename = "topP")]
	top_p: f32,
	#[serde(rename = "topK")]
	top_k: u32,
	#[serde(rename = "maxOutputTokens")]
	max_output_tokens: u32,
	#[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
	response_mime_type: Option<String>,
}

#[derive(Serialize)]
struct VertexSafetySetting {
	category: String,
	threshold: String,
}

#[derive(Deserialize)]
struct GenerateApiResponse {
	candidates: Vec<GenerateApiCandidate>,
	#[serde(rename = "usageMetadata", default)]
	usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct GenerateApiCandidate {
	content: GenerateApiContent,
}

#[derive(Deserialize)]
struct GenerateApiContent {
	parts: Vec<GenerateApiPart>,
}

#[derive(Deserialize)]
struct GenerateApiPart {
	#[serde(default)]
	text: Option<String>,
}

#[derive(Deserialize, Default)]
struct UsageMetadata {
	#[serde(rename = "promptTokenCount", default)]
	prompt_token_count: u32,
	#[serde(rename = "candidatesTokenCount", default)]
	candidates_token_count: u32,
}

fn to_vertex_parts(parts: &[ContentPart]) -> Vec<VertexPart> {
	parts
		.iter()
		.map(|part| match part {
			ContentPart::Text(text) => VertexPart::Text { text: text.clone() },
			ContentPart::FileRef { uri, mime_type } => {
				VertexPart::FileData { file_data: VertexFileData { mime_type: mime_type.clone(), file_uri: uri.clone() } }
			},
		})
		.collect()
}

#[async_trait]
impl GenerativeModel for VertexAiClient {
	async fn generate(&self, model: &str, config: &GenerationConfig, parts: &[ContentPart]) -> ModelResult<GenerateResponse> {
		let request = GenerateRequest {
			contents: vec![GenerateContent { role: "user", parts: to_vertex_parts(parts) }],
			generation_config: VertexGenerationConfig {
				temperature: config.temperature,
				top_p: config.top_p,
				top_k: config.top_k,
				max_output_tokens: config.max_output_tokens,
				response_mime_type: config.response_mime_type.clone(),
			},
			safety_settings: config
				.safety_settings
				.iter()
				.map(|s| VertexSafetySetting { category: s.category.clone(), threshold: s.threshold.clone() })
				.collect(),
			system_instruction: config
				.system_instruction
				.as_ref()
				.map(|text| GenerateContent { role: "system", parts: vec![VertexPart::Text { text: text.clone() }] }),
		};

		let response = self
			.http
			.post(self.generate_url(model))
			.bearer_auth(&self.access_token)
			.json(&request)
			.send()
			.await?;

		if !response.status().is_success() {
			let status = response.status();
			let body = response.text().await.unwrap_or_default();
			return Err(ModelError::call(anyhow::anyhow!("vertex generateContent returned {status}: {body}")));
		}

		let parsed: GenerateApiResponse = response.json().await?;
		let usage = parsed
			.usage_metadata
			.map(|meta| TokenUsage { prompt_tokens: meta.prompt_token_count, candidates_tokens: meta.candidates_token_count })
			.unwrap_or_default();

		if parsed.candidates.is_empty() {
			return Err(ModelError::invalid_response("vertex generateContent returned no candidates"));
		}

		let candidates = parsed
			.candidates
			.into_iter()
			.map(|c| Candidate { text_parts: c.content.parts.into_iter().filter_map(|p| p.text).collect() })
			.collect();

		Ok(GenerateResponse { candidates, usage })
	}
}

#[derive(Deserialize)]
struct PredictResponse {
	predictions: Vec<PredictPrediction>,
}

#[derive(Deserialize)]
struct PredictPrediction {
	embeddings: PredictEmbeddings,
}

#[derive(Deserialize)]
struct PredictEmbeddings {
	values: Vec<f64>,
}

#[async_trait]
impl EmbeddingModel for VertexAiClient {
	async fn embed(&self, model: &str, text: &str) -> ModelResult<Vec<f64>> {
		let request = json!({ "instances": [{ "content": text }] });

		let response = self.http.post(self.embed_url(model)).bearer_auth(&self.access_token).json(&request).send().await?;

		if !response.status().is_success() {
			let status = response.status();
			let body = response.text().await.unwrap_or_default();
			return Err(ModelError::call(anyhow::anyhow!("vertex predict returned {status}: {body}")));
		}

		let parsed: PredictResponse = response.json().await?;
		parsed
			.predictions
			.into_iter()
			.next()
			.map(|prediction| prediction.embeddings.values)
			.ok_or_else(|| ModelError::invalid_response("vertex predict returned no predictions"))
	}
}
