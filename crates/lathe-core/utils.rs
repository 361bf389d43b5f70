use std::{
  collections::hash_map::DefaultHasher,
  hash::{Hash, Hasher},
};

/// Produces a `u64` hash of any hashable value.
///
/// `DefaultHasher::new` uses fixed keys, so the result is stable across runs
/// and builds. Continuation grouping and bitmap interning both key off this,
/// which keeps `translate` byte-for-byte reproducible.
pub fn hash_id_value_u64<T: Hash>(value: &T) -> u64 {
  let mut hasher = DefaultHasher::new();
  value.hash(&mut hasher);
  hasher.finish()
}
