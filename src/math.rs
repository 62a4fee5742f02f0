//! Small collection aliases used throughout the crate.

/// Hash map with a fast non-cryptographic hasher. Label interning and weight
/// distributions are all keyed by small integers, where `FxHashMap` wins.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;
