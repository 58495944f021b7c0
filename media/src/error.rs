use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
	#[error("invalid HH:MM:SS timestamp: {0}")]
	InvalidTimestamp(String),

	#[error("scene {sequence} has non-positive duration")]
	NonPositiveDuration { sequence: u32 },

	#[error("scenes must be ordered 1..N with no gaps: expected sequence {expected}, found {found}")]
	NonSequentialScenes { expected: u32, found: u32 },

	#[error("scene {sequence} is {duration}s, shorter than the 10s minimum")]
	SceneTooShort { sequence: u32, duration: u32 },

	#[error("scene {sequence} ends at {end_seconds}s, past the media's length_seconds of {length_seconds}")]
	SceneExceedsLength { sequence: u32, end_seconds: u32, length_seconds: u32 },

	#[error("category '{0}' is not in the configured closed set")]
	UnknownCategory(String),

	#[error("malformed summary JSON: {0}")]
	MalformedSummary(String),
}
