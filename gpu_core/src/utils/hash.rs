/// Order-sensitive 64-bit hash combiner
///
/// Fields are fed one at a time in a fixed order; the same sequence of values
/// always produces the same hash within a build. Floats are hashed by bit
/// pattern, so `0.0` and `-0.0` differ.

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

#[derive(Default)]
pub struct HashCombiner {
    hasher: FxHasher,
}

impl HashCombiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed any hashable value
    pub fn add<T: Hash + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.hash(&mut self.hasher);
        self
    }

    /// Feed a float by bit pattern
    pub fn add_f32(&mut self, value: f32) -> &mut Self {
        self.hasher.write_u32(value.to_bits());
        self
    }

    /// Feed raw bytes, prefixed with their length
    pub fn add_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.write_usize(bytes.len());
        self.hasher.write(bytes);
        self
    }

    pub fn finish(&self) -> u64 {
        self.hasher.finish()
    }
}

#[cfg(test)]
#[path = "hash_tests.rs"]
mod tests;
