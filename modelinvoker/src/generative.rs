use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelResult;

/// A single safety threshold, e.g. `{category: "HARM_CATEGORY_HARASSMENT",
/// threshold: "BLOCK_ONLY_HIGH"}`. Left as opaque strings: the set of
/// categories/thresholds is defined by whichever provider is wired in, not
/// by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetySetting {
	pub category: String,
	pub threshold: String,
}

/// Default generation parameters a [`crate::ModelInvoker`] applies to every
/// call unless a request overrides them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
	pub temperature: f32,
	pub top_p: f32,
	pub top_k: u32,
	pub max_output_tokens: u32,
	pub safety_settings: Vec<SafetySetting>,
	pub system_instruction: Option<String>,
	pub response_mime_type: Option<String>,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			temperature: 0.2,
			top_p: 0.95,
			top_k: 40,
			max_output_tokens: 8192,
			safety_settings: Vec::new(),
			system_instruction: None,
			response_mime_type: None,
		}
	}
}

/// One piece of a multimodal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContentPart {
	Text(String),
	FileRef { uri: String, mime_type: String },
}

impl ContentPart {
	pub fn text(text: impl Into<String>) -> Self {
		ContentPart::Text(text.into())
	}

	pub fn file(uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
		ContentPart::FileRef { uri: uri.into(), mime_type: mime_type.into() }
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
	pub prompt_tokens: u32,
	pub candidates_tokens: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
	pub text_parts: Vec<String>,
}

impl Candidate {
	pub fn joined_text(&self) -> String {
		self.text_parts.concat()
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
	pub candidates: Vec<Candidate>,
	pub usage: TokenUsage,
}

impl GenerateResponse {
	/// Concatenates text parts across all candidates, in order.
	pub fn joined_text(&self) -> String {
		self.candidates.iter().map(Candidate::joined_text).collect()
	}
}

/// A multimodal generative model handle. Implementations own the wire
/// protocol (HTTP client, auth, request/response shapes) for one provider.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
	async fn generate(
		&self,
		model: &str,
		config: &GenerationConfig,
		parts: &[ContentPart],
	) -> ModelResult<GenerateResponse>;
}

/// A text embedding model handle.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
	async fn embed(&self, model: &str, text: &str) -> ModelResult<Vec<f64>>;
}
