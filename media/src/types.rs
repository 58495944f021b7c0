use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MediaError, MediaResult};

/// Closed set of ratings a Media may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rating {
	G,
	Pg,
	#[serde(rename = "PG-13")]
	Pg13,
	R,
	#[serde(rename = "NC-17")]
	Nc17,
}

impl Rating {
	pub fn as_str(self) -> &'static str {
		match self {
			Rating::G => "G",
			Rating::Pg => "PG",
			Rating::Pg13 => "PG-13",
			Rating::R => "R",
			Rating::Nc17 => "NC-17",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
	pub character_name: String,
	pub actor_name: String,
}

/// A contiguous time range within a media item with an extracted script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
	pub sequence: u32,
	pub start: String,
	pub end: String,
	pub script: String,
}

/// The top-level persisted entity describing one media item and its scenes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
	pub id: Uuid,
	pub title: String,
	pub category: String,
	pub summary: String,
	pub length_seconds: u32,
	pub media_url: String,
	pub director: String,
	pub release_year: u32,
	pub genre: String,
	pub rating: Rating,
	pub cast: Vec<CastMember>,
	pub scenes: Vec<Scene>,
	pub create_date: DateTime<Utc>,
}

/// The vector embedding of a single scene's script. Exists iff the analyzer
/// has committed the parent Media and the embedder has since processed it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneEmbedding {
	pub media_id: Uuid,
	pub sequence: u32,
	pub model_name: String,
	pub embeddings: Vec<f64>,
}

/// Transient head-of-Media projection used to seed the scene extractor; the
/// `scene_time_stamps` list is consumed and discarded once extraction runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSummary {
	pub title: String,
	pub category: String,
	pub summary: String,
	pub length_seconds: u32,
	pub media_url: Option<String>,
	pub director: String,
	pub release_year: u32,
	pub genre: String,
	pub rating: Rating,
	pub cast: Vec<CastMember>,
	pub scene_time_stamps: Vec<SceneTimeStamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneTimeStamp {
	pub start: String,
	pub end: String,
}

/// Minimal projection of a bus notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcsObject {
	pub bucket: String,
	pub name: String,
	pub mime_type: String,
}

/// Parses a zero-padded `HH:MM:SS` timestamp into whole seconds.
pub fn parse_hms(value: &str) -> MediaResult<u32> {
	let parts: Vec<&str> = value.split(':').collect();
	if parts.len() != 3 {
		return Err(MediaError::InvalidTimestamp(value.to_string()));
	}
	let mut seconds = 0u32;
	for part in &parts {
		let n: u32 = part.parse().map_err(|_| MediaError::InvalidTimestamp(value.to_string()))?;
		seconds = seconds * 60 + n;
	}
	Ok(seconds)
}

impl Scene {
	pub fn duration_seconds(&self) -> MediaResult<u32> {
		let start = parse_hms(&self.start)?;
		let end = parse_hms(&self.end)?;
		if end <= start {
			return Err(MediaError::NonPositiveDuration { sequence: self.sequence });
		}
		Ok(end - start)
	}
}

pub const MIN_SCENE_DURATION_SECONDS: u32 = 10;

/// Validates the invariants on `Media::scenes`: strictly ordered by
/// `sequence` ascending with no gaps starting from 1, `end > start`,
/// minimum 10-second duration, and total coverage within `length_seconds`.
pub fn validate_scenes(scenes: &[Scene], length_seconds: u32) -> MediaResult<()> {
	for (index, scene) in scenes.iter().enumerate() {
		let expected = (index + 1) as u32;
		if scene.sequence != expected {
			return Err(MediaError::NonSequentialScenes { expected, found: scene.sequence });
		}
		let duration = scene.duration_seconds()?;
		if duration < MIN_SCENE_DURATION_SECONDS {
			return Err(MediaError::SceneTooShort { sequence: scene.sequence, duration });
		}
		let end_seconds = parse_hms(&scene.end)?;
		if end_seconds > length_seconds {
			return Err(MediaError::SceneExceedsLength { sequence: scene.sequence, end_seconds, length_seconds });
		}
	}
	Ok(())
}

/// Renumbers `scenes` in place by ascending `start` time, assigning
/// sequence 1..N. Used by assembly when the model-reported `sequence`
/// values from independent worker completions need a canonical order.
pub fn renumber_by_start(mut scenes: Vec<Scene>) -> Vec<Scene> {
	scenes.sort_by(|a, b| a.start.cmp(&b.start));
	for (index, scene) in scenes.iter_mut().enumerate() {
		scene.sequence = (index + 1) as u32;
	}
	scenes
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_zero_padded_timestamp() {
		assert_eq!(parse_hms("00:01:05").unwrap(), 65);
		assert_eq!(parse_hms("01:00:00").unwrap(), 3600);
	}

	#[test]
	fn rejects_malformed_timestamp() {
		assert!(parse_hms("1:2").is_err());
	}

	fn scene(sequence: u32, start: &str, end: &str) -> Scene {
		Scene { sequence, start: start.to_string(), end: end.to_string(), script: "x".to_string() }
	}

	#[test]
	fn validates_well_formed_scene_list() {
		let scenes = vec![scene(1, "00:00:00", "00:00:15"), scene(2, "00:00:15", "00:00:30")];
		assert!(validate_scenes(&scenes, 30).is_ok());
	}

	#[test]
	fn rejects_gap_in_sequence() {
		let scenes = vec![scene(1, "00:00:00", "00:00:15"), scene(3, "00:00:15", "00:00:30")];
		assert!(matches!(validate_scenes(&scenes, 30), Err(MediaError::NonSequentialScenes { .. })));
	}

	#[test]
	fn rejects_scene_shorter_than_minimum() {
		let scenes = vec![scene(1, "00:00:00", "00:00:05")];
		assert!(matches!(validate_scenes(&scenes, 30), Err(MediaError::SceneTooShort { .. })));
	}

	#[test]
	fn rejects_scene_past_media_length() {
		let scenes = vec![scene(1, "00:00:00", "00:01:00")];
		assert!(matches!(validate_scenes(&scenes, 30), Err(MediaError::SceneExceedsLength { .. })));
	}

	#[test]
	fn renumbers_by_start_time() {
		let scenes = vec![scene(7, "00:00:15", "00:00:30"), scene(2, "00:00:00", "00:00:15")];
		let renumbered = renumber_by_start(scenes);
		assert_eq!(renumbered[0].sequence, 1);
		assert_eq!(renumbered[0].start, "00:00:00");
		assert_eq!(renumbered[1].sequence, 2);
	}
}
