use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Stable 64-bit hash of a string key, seeded.
///
/// Used wherever a choice must look arbitrary but stay reproducible across runs and platforms.
pub(crate) fn stable_hash(key: &str, seed: u64) -> u64 {
    xxh3_64_with_seed(key.as_bytes(), seed)
}

/// Stable index in `0..len` for `key`. `len` must be non-zero.
pub(crate) fn stable_index(key: &str, seed: u64, len: usize) -> usize {
    debug_assert!(len > 0);
    (stable_hash(key, seed) % len as u64) as usize
}
