use serde::{Deserialize, Serialize};

/// One entry of the `subscriptions.<logical>.{name, dead_letter,
/// timeout_seconds}` configuration block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
	pub name: String,
	#[serde(default)]
	pub dead_letter: Option<String>,
	pub timeout_seconds: u64,
}
