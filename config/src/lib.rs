use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use mediasearch_media::CategoryConfig;
use mediasearch_listener::SubscriptionConfig;
use mediasearch_objectstore::ObjectStoreConfig;
use mediasearch_steps::PromptsConfig;
use mediasearch_storage::ColumnarStoreConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Name of the base config file loaded by [`load_app_config`] relative to
/// the working directory, overridden by `--config` on the CLI.
pub const DEFAULT_CONFIG_PATH: &str = "config/mediasearch.config.yaml";

/// Selects which `config/<env>.mediasearch.config.yaml` override file, if
/// any, is merged on top of the base file.
pub const CONFIG_ENV_VAR: &str = "MEDIASEARCH_ENV";

/// The `application.{name, project_id, location, thread_pool_size,
/// signer_service_account_email}` configuration block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
	pub name: String,
	pub project_id: String,
	pub location: String,
	#[serde(default)]
	pub thread_pool_size: Option<usize>,
	pub signer_service_account_email: String,
}

/// One entry of the `embedding_models.<logical>` configuration block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelConfig {
	pub model: String,
	pub max_requests_per_minute: u32,
}

/// One entry of the `agent_models.<logical>` configuration block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentModelConfig {
	pub model: String,
	#[serde(default)]
	pub system_instructions: Option<String>,
	pub temperature: f32,
	pub top_p: f32,
	pub top_k: u32,
	pub max_tokens: u32,
	#[serde(default)]
	pub output_format: Option<String>,
	pub rate_limit: u32,
}

/// The full, closed configuration surface for a node process. Loaded by
/// [`load_app_config`]; every recognized key is named here, so an unknown
/// key in the YAML is a deserialization error rather than silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
	pub application: ApplicationConfig,
	pub storage: ObjectStoreConfig,
	pub columnar: ColumnarStoreConfig,
	pub prompts: PromptsConfig,
	#[serde(default)]
	pub subscriptions: HashMap<String, SubscriptionConfig>,
	#[serde(default)]
	pub embedding_models: HashMap<String, EmbeddingModelConfig>,
	#[serde(default)]
	pub agent_models: HashMap<String, AgentModelConfig>,
	#[serde(default)]
	pub categories: HashMap<String, CategoryConfig>,
}

/// Deep-merges `override_value` into `base`, recursing into nested maps so
/// an override file only needs to name the keys it actually changes.
fn merge_yaml(base: &mut serde_yaml::Value, override_value: serde_yaml::Value) {
	match (base, override_value) {
		(serde_yaml::Value::Mapping(base_map), serde_yaml::Value::Mapping(override_map)) => {
			for (key, override_entry) in override_map {
				match base_map.get_mut(&key) {
					Some(base_entry) => merge_yaml(base_entry, override_entry),
					None => {
						base_map.insert(key, override_entry);
					},
				}
			}
		},
		(base_slot, override_value) => *base_slot = override_value,
	}
}

/// Loads `base_path`, then merges `config/<env>.mediasearch.config.yaml`
/// on top of it if [`CONFIG_ENV_VAR`] is set, producing the final
/// [`AppConfig`]. A base file alone is a complete, valid configuration;
/// the override file only needs to carry the keys that differ per
/// environment.
pub async fn load_app_config(base_path: &str) -> anyhow::Result<AppConfig> {
	let base_bytes = tokio::fs::read(base_path)
		.await
		.with_context(|| format!("failed to read config file at `{base_path}`"))?;
	let mut merged: serde_yaml::Value =
		serde_yaml::from_slice(&base_bytes).with_context(|| format!("failed to parse config YAML at `{base_path}`"))?;

	if let Ok(env_name) = std::env::var(CONFIG_ENV_VAR) {
		let override_dir = Path::new(base_path).parent().unwrap_or_else(|| Path::new("."));
		let override_path = override_dir.join(format!("{env_name}.mediasearch.config.yaml"));
		if override_path.exists() {
			let override_bytes = tokio::fs::read(&override_path)
				.await
				.with_context(|| format!("failed to read config override at `{}`", override_path.display()))?;
			let override_value: serde_yaml::Value = serde_yaml::from_slice(&override_bytes)
				.with_context(|| format!("failed to parse config override YAML at `{}`", override_path.display()))?;
			merge_yaml(&mut merged, override_value);
			info!(override_path = %override_path.display(), "merged config override");
		}
	}

	let config: AppConfig =
		serde_yaml::from_value(merged).with_context(|| format!("config at `{base_path}` does not match the expected schema"))?;
	info!(config_path = %base_path, application = %config.application.name, "loaded app config");
	Ok(config)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn merge_overrides_only_named_keys() {
		let mut base: serde_yaml::Value = serde_yaml::from_str(
			r#"
application:
  name: base-app
  project_id: proj
storage:
  hi_res_bucket: hi
"#,
		)
		.unwrap();
		let over: serde_yaml::Value = serde_yaml::from_str(
			r#"
application:
  project_id: proj-staging
"#,
		)
		.unwrap();
		merge_yaml(&mut base, over);
		assert_eq!(base["application"]["name"].as_str().unwrap(), "base-app");
		assert_eq!(base["application"]["project_id"].as_str().unwrap(), "proj-staging");
		assert_eq!(base["storage"]["hi_res_bucket"].as_str().unwrap(), "hi");
	}
}
