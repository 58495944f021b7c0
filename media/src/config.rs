use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{MediaError, MediaResult};

/// One entry of the `categories.<key>` configuration block: a named,
/// model-facing category with its own optional prompt overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
	pub name: String,
	pub definition: String,
	#[serde(default)]
	pub system_instructions: Option<String>,
	#[serde(default)]
	pub summary: Option<String>,
	#[serde(default)]
	pub scene: Option<String>,
}

/// The closed set of categories a Media's `category` field may take,
/// loaded once from configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryRegistry(HashMap<String, CategoryConfig>);

impl CategoryRegistry {
	pub fn new(categories: HashMap<String, CategoryConfig>) -> Self {
		Self(categories)
	}

	pub fn get(&self, key: &str) -> Option<&CategoryConfig> {
		self.0.get(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	/// Rejects any category not present in the configured set, per the
	/// model being prompt-constrained to emit only these values.
	pub fn validate(&self, key: &str) -> MediaResult<()> {
		if self.0.contains_key(key) {
			Ok(())
		} else {
			Err(MediaError::UnknownCategory(key.to_string()))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn registry() -> CategoryRegistry {
		let mut map = HashMap::new();
		map.insert(
			"action".to_string(),
			CategoryConfig {
				name: "Action".to_string(),
				definition: "high-energy physical conflict".to_string(),
				system_instructions: None,
				summary: None,
				scene: None,
			},
		);
		CategoryRegistry::new(map)
	}

	#[test]
	fn accepts_configured_category() {
		assert!(registry().validate("action").is_ok());
	}

	#[test]
	fn rejects_unknown_category() {
		assert!(registry().validate("documentary").is_err());
	}
}
