//! Aliases for the common collection types used throughout the compiler.

pub type Array<T> = Vec<T>;
pub type Map<K, V> = std::collections::HashMap<K, V>;
pub type OrderedMap<K, V> = std::collections::BTreeMap<K, V>;
pub type OrderedSet<K> = std::collections::BTreeSet<K>;
pub type Queue<T> = std::collections::VecDeque<T>;
