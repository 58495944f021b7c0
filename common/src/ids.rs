use once_cell::sync::Lazy;
use uuid::Uuid;

/// The namespace every content-derived id in this system is hashed under.
///
/// Using `Uuid::NAMESPACE_URL` (rather than a private namespace) means the id
/// derivation is reproducible by any independent UUIDv5 implementation given
/// only the object name.
pub static NS_URL: Lazy<Uuid> = Lazy::new(|| Uuid::NAMESPACE_URL);

/// Derives the deterministic identity for a media item from its object name.
///
/// Two notifications naming the same object always yield the same id, which
/// is what makes at-least-once ingestion idempotent at the row level.
pub fn media_id(object_name: &str) -> Uuid {
	Uuid::new_v5(&NS_URL, object_name.as_bytes())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn media_id_is_stable() {
		let a = media_id("test-trailer-001.mp4");
		let b = media_id("test-trailer-001.mp4");
		assert_eq!(a, b);
	}

	#[test]
	fn media_id_matches_independent_uuidv5() {
		// Computed independently via python's `uuid.uuid5(uuid.NAMESPACE_URL, "test-trailer-001.mp4")`.
		let expected = Uuid::parse_str("14cd9c58-925a-57e1-84af-030affa05724").unwrap();
		assert_eq!(media_id("test-trailer-001.mp4"), expected);
	}

	#[test]
	fn different_names_yield_different_ids() {
		assert_ne!(media_id("a.mp4"), media_id("b.mp4"));
	}
}
