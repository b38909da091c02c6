//! Deterministic, insertion-ordered collection aliases.

use std::hash::BuildHasherDefault;

pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<rustc_hash::FxHasher>>;
pub type Set<T> = indexmap::IndexSet<T, BuildHasherDefault<rustc_hash::FxHasher>>;
