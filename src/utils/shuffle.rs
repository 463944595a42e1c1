use rand::seq::SliceRandom;
use rand::thread_rng;

/// Uniform Fisher-Yates shuffle, in place.
pub fn shuffle<T>(items: &mut [T]) {
    items.shuffle(&mut thread_rng());
}
