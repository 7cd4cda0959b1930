//! Thin wrapper around the `xxhash-rust` crate providing the XXH32/XXH64 API
//! used by the rest of this crate.
//!
//! XXH32 covers header, block, and default content checksums; XXH64 is only
//! reached through the wide content-check option.

pub use xxhash_rust::xxh32::Xxh32 as Xxh32State;
pub use xxhash_rust::xxh64::Xxh64 as Xxh64State;

/// One-shot XXH32 hash.
///
/// # Parity vectors
/// * `xxh32_oneshot(b"", 0)` == `0x02CC5D05`
#[inline]
pub fn xxh32_oneshot(data: &[u8], seed: u32) -> u32 {
    xxhash_rust::xxh32::xxh32(data, seed)
}

/// One-shot XXH64 hash.
#[inline]
pub fn xxh64_oneshot(data: &[u8], seed: u64) -> u64 {
    xxhash_rust::xxh64::xxh64(data, seed)
}
