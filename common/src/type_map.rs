use std::{
	any::Any,
	collections::HashMap,
	fmt,
};

/// A heterogeneous, string-keyed value bag.
///
/// Keyed by string rather than by `TypeId`, so the same bag can hold an open,
/// application-defined set of keys (`__IN__`, `__OUT__`, and whatever
/// well-known domain keys callers agree on). Values are type-erased behind
/// `Any` and downcast on read; a key holding the wrong type is a programming
/// error in the caller's wiring, so `get`/`get_mut` panic rather than
/// silently returning `None` in that case.
#[derive(Default)]
pub struct ValueBag(HashMap<String, Box<dyn Any + Send + Sync>>);

impl fmt::Debug for ValueBag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ValueBag").field("keys", &self.0.keys().collect::<Vec<_>>()).finish()
	}
}

impl ValueBag {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
		self.0.insert(key.into(), Box::new(value));
	}

	pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
		self.0.get(key).map(|instance| {
			instance.downcast_ref::<T>().expect("value stored under key was of a different type")
		})
	}

	pub fn get_mut<T: Any + Send + Sync>(&mut self, key: &str) -> Option<&mut T> {
		self.0.get_mut(key).map(|instance| {
			instance.downcast_mut::<T>().expect("value stored under key was of a different type")
		})
	}

	/// Removes and returns the value under `key`, if any and if it is of type `T`.
	pub fn remove<T: Any + Send + Sync>(&mut self, key: &str) -> Option<T> {
		self.0.remove(key).map(|instance| {
			*instance.downcast::<T>().expect("value stored under key was of a different type")
		})
	}

	/// Removes `key` regardless of type, used when a caller only needs to
	/// clear the slot (e.g. the pipeline's `__IN__`/`__OUT__` housekeeping).
	pub fn clear_key(&mut self, key: &str) {
		self.0.remove(key);
	}

	/// Removes and returns the boxed value under `key` without knowing its
	/// concrete type, for callers (like a pipeline's output→input piping)
	/// that only move a value around without inspecting it.
	pub fn take_any(&mut self, key: &str) -> Option<Box<dyn Any + Send + Sync>> {
		self.0.remove(key)
	}

	/// Inserts an already-boxed, type-erased value under `key`.
	pub fn put_any(&mut self, key: impl Into<String>, value: Box<dyn Any + Send + Sync>) {
		self.0.insert(key.into(), value);
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn insert_get_roundtrip() {
		let mut bag = ValueBag::new();
		bag.insert("__IN__", 42i32);
		assert_eq!(bag.get::<i32>("__IN__"), Some(&42));
		assert!(!bag.contains("__OUT__"));
	}

	#[test]
	fn remove_clears_slot() {
		let mut bag = ValueBag::new();
		bag.insert("k", String::from("v"));
		assert_eq!(bag.remove::<String>("k"), Some(String::from("v")));
		assert!(!bag.contains("k"));
	}
}
