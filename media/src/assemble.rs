use chrono::Utc;

use crate::{
	config::CategoryRegistry,
	error::MediaResult,
	types::{renumber_by_start, validate_scenes, Media, MediaSummary},
};

/// Combines a [`MediaSummary`] and the scene list extracted for it into a
/// [`Media`], deriving `id` from `object_name` and renumbering scenes by
/// start time before validating the result's invariants.
pub fn assemble_media(
	object_name: &str,
	media_url: String,
	summary: MediaSummary,
	scenes: Vec<crate::types::Scene>,
	categories: &CategoryRegistry,
) -> MediaResult<Media> {
	categories.validate(&summary.category)?;
	let scenes = renumber_by_start(scenes);
	validate_scenes(&scenes, summary.length_seconds)?;

	Ok(Media {
		id: mediasearch_common::media_id(object_name),
		title: summary.title,
		category: summary.category,
		summary: summary.summary,
		length_seconds: summary.length_seconds,
		media_url,
		director: summary.director,
		release_year: summary.release_year,
		genre: summary.genre,
		rating: summary.rating,
		cast: summary.cast,
		scenes,
		create_date: Utc::now(),
	})
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;
	use crate::{config::CategoryConfig, types::Scene};

	fn categories() -> CategoryRegistry {
		let mut map = HashMap::new();
		map.insert(
			"action".to_string(),
			CategoryConfig {
				name: "Action".to_string(),
				definition: "d".to_string(),
				system_instructions: None,
				summary: None,
				scene: None,
			},
		);
		CategoryRegistry::new(map)
	}

	fn summary() -> MediaSummary {
		MediaSummary {
			title: "Test Trailer".to_string(),
			category: "action".to_string(),
			summary: "a summary".to_string(),
			length_seconds: 30,
			media_url: None,
			director: "Someone".to_string(),
			release_year: 2020,
			genre: "Action".to_string(),
			rating: crate::types::Rating::Pg13,
			cast: vec![],
			scene_time_stamps: vec![],
		}
	}

	#[test]
	fn assembles_and_renumbers_scenes() {
		let scenes = vec![
			Scene { sequence: 99, start: "00:00:15".to_string(), end: "00:00:30".to_string(), script: "b".to_string() },
			Scene { sequence: 1, start: "00:00:00".to_string(), end: "00:00:15".to_string(), script: "a".to_string() },
		];
		let media =
			assemble_media("test-trailer-001.mp4", "https://example/test-trailer-001.mp4".to_string(), summary(), scenes, &categories())
				.unwrap();
		assert_eq!(media.id, mediasearch_common::media_id("test-trailer-001.mp4"));
		assert_eq!(media.scenes[0].script, "a");
		assert_eq!(media.scenes[0].sequence, 1);
		assert_eq!(media.scenes[1].sequence, 2);
	}

	#[test]
	fn rejects_unknown_category() {
		let mut s = summary();
		s.category = "documentary".to_string();
		let result = assemble_media("x.mp4", "https://example/x.mp4".to_string(), s, vec![], &categories());
		assert!(result.is_err());
	}
}
