//! Byte-oriented LZ block codec.
//!
//! This is the backend the stream engine hands raw blocks to.  It is a
//! deliberately simple greedy LZ77: a hash table of 4-byte sequences feeds a
//! token/literal/match emitter, and the decoder replays the token stream with
//! full bounds checking.  The stream layer treats the payloads as opaque; the
//! only contract is `decompress_block(compress_block(b)) == b` and that the
//! decoder rejects, never tolerates, structurally invalid input.

pub mod compress;
pub mod decompress;

pub use compress::{compress_block, compress_bound, MatchTable};
pub use decompress::{decompress_block, MalformedBlock};

/// Minimum match length the emitter will encode.
pub const MIN_MATCH: usize = 4;

/// Inputs shorter than this are emitted as bare literals: there is not enough
/// room for a match plus the mandatory literal tail.
pub const MF_LIMIT: usize = 12;

/// The final bytes of every block are always literals; matches may not extend
/// into this tail.
pub const LAST_LITERALS: usize = 5;

/// Maximum backward match distance (16-bit offsets on the wire).
pub const MAX_OFFSET: usize = 65_535;

/// Token layout: high nibble = literal run, low nibble = match length − 4.
pub const ML_BITS: u32 = 4;
pub const ML_MASK: u8 = (1 << ML_BITS) - 1;
pub const RUN_MASK: u8 = (1 << (8 - ML_BITS)) - 1;

/// Log₂ of the match-finder hash table entry count (13 → 8192 entries, 32 KiB).
pub const HASH_LOG: u32 = 13;
pub const HASH_SIZE: usize = 1 << HASH_LOG;
