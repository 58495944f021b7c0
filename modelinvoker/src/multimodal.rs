use mediasearch_common::metrics::IntCounter;
use mediasearch_pipeline::PipelineContext;

use crate::{
	error::{ModelError, ModelErrorKind, ModelResult},
	generative::ContentPart,
	invoker::ModelInvoker,
};

const MAX_TRIES: u32 = 3;

/// Strips a leading fenced ```json and trailing ``` if present, leaving the
/// model's JSON payload bare. A model that didn't fence its output is
/// returned unchanged.
pub fn strip_json_fence(text: &str) -> String {
	let trimmed = text.trim();
	let without_prefix =
		trimmed.strip_prefix("```json").or_else(|| trimmed.strip_prefix("```JSON")).unwrap_or(trimmed);
	let without_prefix = without_prefix.strip_prefix('\n').unwrap_or(without_prefix);
	without_prefix.strip_suffix("```").unwrap_or(without_prefix).trim().to_string()
}

/// Calls `invoker.generate` and, on failure, retries up to [`MAX_TRIES`]
/// times (counted separately from the invoker's own 60-second backoff
/// retries), incrementing `retry_counter` once per retry. On success,
/// records prompt/candidate token counts, concatenates the text parts of
/// every candidate, strips a fenced ```json wrapper if present, and returns
/// the resulting string.
pub async fn generate_multimodal(
	ctx: &PipelineContext,
	in_token_counter: &IntCounter,
	out_token_counter: &IntCounter,
	retry_counter: &IntCounter,
	invoker: &ModelInvoker,
	content: &[ContentPart],
) -> ModelResult<String> {
	let mut try_count = 0u32;
	loop {
		match invoker.generate(ctx, content).await {
			Ok(response) => {
				in_token_counter.inc_by(response.usage.prompt_tokens as u64);
				out_token_counter.inc_by(response.usage.candidates_tokens as u64);
				return Ok(strip_json_fence(&response.joined_text()));
			},
			Err(err) => {
				if try_count >= MAX_TRIES {
					return Err(ModelError::new(ModelErrorKind::MaxRetriesExceeded, err.source.clone())
						.add_context("generate_multimodal exhausted its retries"));
				}
				try_count += 1;
				retry_counter.inc();
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_fenced_json() {
		let raw = "```json\n{\"a\":1}\n```";
		assert_eq!(strip_json_fence(raw), "{\"a\":1}");
	}

	#[test]
	fn leaves_unfenced_json_unchanged() {
		let raw = "{\"a\":1}";
		assert_eq!(strip_json_fence(raw), "{\"a\":1}");
	}
}
