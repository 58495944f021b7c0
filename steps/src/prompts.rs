use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// The `prompts.{summary, scene}` configuration block: Handlebars
/// templates rendered with per-call variables before being sent to the
/// model as the text part of a multimodal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
	pub summary: String,
	pub scene: String,
}

/// Renders `template` against `vars` with a scratch [`Handlebars`] registry.
/// Templates fail closed: a rendering error surfaces as an error string
/// rather than a partially-substituted prompt reaching the model.
pub fn render(template: &str, vars: &serde_json::Value) -> Result<String, handlebars::RenderError> {
	let hb = Handlebars::new();
	hb.render_template(template, vars)
}

pub fn summary_vars(categories: &[(&str, &str)]) -> serde_json::Value {
	let categories: Vec<_> = categories
		.iter()
		.map(|(key, definition)| json!({ "key": key, "definition": definition }))
		.collect();
	json!({
		"categories": categories,
		"example_json": summary_example_json(),
	})
}

pub fn scene_vars(sequence: u32, summary_text: &str, start: &str, end: &str) -> serde_json::Value {
	json!({
		"sequence": sequence,
		"summary_text": summary_text,
		"time_start": start,
		"time_end": end,
		"example_json": scene_example_json(),
	})
}

fn summary_example_json() -> &'static str {
	r#"{"title":"Example","category":"action","summary":"...","length_seconds":120,"director":"...","release_year":2024,"genre":"...","rating":"PG-13","cast":[],"scene_time_stamps":[{"start":"00:00:00","end":"00:00:30"}]}"#
}

fn scene_example_json() -> &'static str {
	r#"{"sequence":1,"start":"00:00:00","end":"00:00:30","script":"..."}"#
}
