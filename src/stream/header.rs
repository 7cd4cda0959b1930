//! Wire-format constants, byte-order helpers, header checksum, and sizing
//! utilities shared by the encoder and decoder.
//!
//! Stream layout:
//!
//! ```text
//! ┌───────────────┬─────┬─────┬─────┐
//! │ magic (u32 LE)│ FLG │ BD  │ HC  │   stream header, 7 bytes
//! └───────────────┴─────┴─────┴─────┘
//! ┌───────────────┬─────────┬───────────┐
//! │ BH (u32 LE)   │ payload │ [blk CRC] │   repeated per block
//! └───────────────┴─────────┴───────────┘
//! ┌───────────────┬──────────────────┐
//! │ 0 (end mark)  │ content check    │   trailer
//! └───────────────┴──────────────────┘
//! ```
//!
//! FLG: bits 7-6 format version, bits 4-3 check id, bit 2 block checksums,
//! all other bits reserved-zero.  BD: bits 6-0 log₂ of the dictionary size.
//! BH: bit 31 marks a stored (uncompressed) payload, bits 30-0 its length;
//! an all-zero BH is the end mark.

use crate::codec::compress_bound;
use crate::config::{BLOCK_SIZE_MAX, BLOCK_SIZE_MIN, DICT_SIZE_MAX, DICT_SIZE_MIN, PRESET_MAX};
use crate::stream::types::{Check, EncoderConfig, Error};
use crate::xxhash::xxh32_oneshot;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Stream magic number (`b"xzr\x1A"` read as little-endian u32).
pub const STREAM_MAGIC: u32 = 0x1A72_7A78;

/// Fixed stream header length in bytes.
pub const STREAM_HEADER_SIZE: usize = 7;

/// Block header length in bytes.
pub const BLOCK_HEADER_SIZE: usize = 4;

/// Per-block checksum length in bytes (when enabled).
pub const BLOCK_CHECK_SIZE: usize = 4;

/// Block header value terminating the block sequence.
pub const END_MARK: u32 = 0;

/// High bit of a block header: payload is stored verbatim, not coded.
pub const BLOCK_STORED_FLAG: u32 = 0x8000_0000;

/// Format version carried in FLG bits 7-6.
pub const FORMAT_VERSION: u8 = 1;

// FLG bit positions.
const FLG_CHECK_SHIFT: u8 = 3;
const FLG_BLOCK_CHECK_BIT: u8 = 1 << 2;
// Reserved: bit 5 and bits 1-0.
const FLG_RESERVED_MASK: u8 = 0b0010_0011;

// ─────────────────────────────────────────────────────────────────────────────
// Byte-order helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Read a little-endian `u32` from `src` at byte `offset`.
#[inline]
pub fn read_le32(src: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        src[offset],
        src[offset + 1],
        src[offset + 2],
        src[offset + 3],
    ])
}

/// Write a little-endian `u32` into `dst` at byte `offset`.
#[inline]
pub fn write_le32(dst: &mut [u8], offset: usize, value: u32) {
    dst[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Read a little-endian `u64` from `src` at byte `offset`.
#[inline]
pub fn read_le64(src: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&src[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

/// Write a little-endian `u64` into `dst` at byte `offset`.
#[inline]
pub fn write_le64(dst: &mut [u8], offset: usize, value: u64) {
    dst[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

// ─────────────────────────────────────────────────────────────────────────────
// Header checksum
// ─────────────────────────────────────────────────────────────────────────────

/// One-byte header checksum over the FLG and BD fields: the second byte of
/// their XXH32 digest.
#[inline]
pub fn header_checksum(flg: u8, bd: u8) -> u8 {
    ((xxh32_oneshot(&[flg, bd], 0) >> 8) & 0xFF) as u8
}

// ─────────────────────────────────────────────────────────────────────────────
// FLG / BD encoding
// ─────────────────────────────────────────────────────────────────────────────

/// Assemble the FLG byte from encoder parameters.
pub fn build_flg(check: Check, block_checksums: bool) -> u8 {
    let mut flg = FORMAT_VERSION << 6;
    flg |= check.wire_id() << FLG_CHECK_SHIFT;
    if block_checksums {
        flg |= FLG_BLOCK_CHECK_BIT;
    }
    flg
}

/// Decode the FLG byte; rejects unknown versions, reserved bits, and
/// unsupported check ids.
pub fn parse_flg(flg: u8) -> Result<(Check, bool), Error> {
    if (flg >> 6) != FORMAT_VERSION {
        return Err(Error::VersionUnsupported);
    }
    if flg & FLG_RESERVED_MASK != 0 {
        return Err(Error::ReservedFlagSet);
    }
    let check =
        Check::from_wire_id((flg >> FLG_CHECK_SHIFT) & 0x3).ok_or(Error::CheckUnsupported)?;
    Ok((check, flg & FLG_BLOCK_CHECK_BIT != 0))
}

/// Encode a dictionary size (a validated power of two) as the BD byte.
pub fn dict_size_code(dict_size: u32) -> u8 {
    dict_size.trailing_zeros() as u8
}

/// Decode the BD byte back into a dictionary size.
pub fn dict_size_from_code(bd: u8) -> Result<u32, Error> {
    if bd & 0x80 != 0 {
        return Err(Error::ReservedFlagSet);
    }
    let min_code = DICT_SIZE_MIN.trailing_zeros() as u8;
    let max_code = DICT_SIZE_MAX.trailing_zeros() as u8;
    if bd < min_code || bd > max_code {
        return Err(Error::DictSizeUnsupported);
    }
    Ok(1u32 << bd)
}

// ─────────────────────────────────────────────────────────────────────────────
// Sizing
// ─────────────────────────────────────────────────────────────────────────────

/// Dictionary size selected by each preset when the caller leaves
/// `dict_size` at 0.
const PRESET_DICT_SIZES: [u32; 10] = [
    64 << 10,   // 0
    64 << 10,   // 1
    128 << 10,  // 2
    256 << 10,  // 3
    512 << 10,  // 4
    1 << 20,    // 5
    1 << 20,    // 6
    2 << 20,    // 7
    4 << 20,    // 8
    4 << 20,    // 9
];

/// Dictionary size for a preset; `None` when the preset is out of range.
pub fn preset_dict_size(preset: u32) -> Option<u32> {
    PRESET_DICT_SIZES.get(preset as usize).copied()
}

/// Per-block accumulation size for a dictionary size.
#[inline]
pub fn block_size_for(dict_size: u32) -> usize {
    (dict_size as usize).clamp(BLOCK_SIZE_MIN, BLOCK_SIZE_MAX)
}

/// Resolve and validate an encoder configuration into its dictionary size.
pub fn resolve_dict_size(cfg: &EncoderConfig) -> Result<u32, Error> {
    if cfg.preset > PRESET_MAX {
        return Err(Error::PresetInvalid);
    }
    if cfg.dict_size == 0 {
        return preset_dict_size(cfg.preset).ok_or(Error::PresetInvalid);
    }
    if !cfg.dict_size.is_power_of_two()
        || cfg.dict_size < DICT_SIZE_MIN
        || cfg.dict_size > DICT_SIZE_MAX
    {
        return Err(Error::DictSizeInvalid);
    }
    Ok(cfg.dict_size)
}

/// Worst-case encoded size for `src_len` input bytes under `cfg`.
///
/// Every block may end up stored raw (header + payload + optional checksum),
/// plus the stream header, end mark, and trailer digest.
pub fn encode_bound(src_len: usize, cfg: &EncoderConfig) -> Result<usize, Error> {
    let dict_size = resolve_dict_size(cfg)?;
    let block_size = block_size_for(dict_size);
    let blocks = src_len.div_ceil(block_size);
    let per_block = BLOCK_HEADER_SIZE
        + if cfg.block_checksums {
            BLOCK_CHECK_SIZE
        } else {
            0
        };
    Ok(STREAM_HEADER_SIZE
        + src_len
        + blocks * per_block
        + BLOCK_HEADER_SIZE
        + cfg.check.digest_len())
}

/// Upper bound on a coded payload's declared length for a given block size;
/// anything larger on the wire is corrupt.
#[inline]
pub fn coded_payload_limit(block_size: usize) -> usize {
    compress_bound(block_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn le_helpers_round_trip() {
        let mut buf = [0u8; 12];
        write_le32(&mut buf, 1, 0xDEAD_BEEF);
        assert_eq!(read_le32(&buf, 1), 0xDEAD_BEEF);
        write_le64(&mut buf, 4, 0x0123_4567_89AB_CDEF);
        assert_eq!(read_le64(&buf, 4), 0x0123_4567_89AB_CDEF);
    }

    #[test]
    fn flg_round_trip() {
        for check in [Check::None, Check::Xxh32, Check::Xxh64] {
            for blk in [false, true] {
                let flg = build_flg(check, blk);
                assert_eq!(parse_flg(flg), Ok((check, blk)));
            }
        }
    }

    #[test]
    fn flg_rejects_bad_bytes() {
        // version 0
        assert_eq!(parse_flg(0x00), Err(Error::VersionUnsupported));
        // reserved bit 5
        assert_eq!(
            parse_flg(build_flg(Check::Xxh32, false) | 0x20),
            Err(Error::ReservedFlagSet)
        );
        // check id 3
        assert_eq!(
            parse_flg((FORMAT_VERSION << 6) | (3 << FLG_CHECK_SHIFT)),
            Err(Error::CheckUnsupported)
        );
    }

    #[test]
    fn dict_code_round_trip() {
        for shift in [12u8, 16, 20, 30] {
            let size = 1u32 << shift;
            assert_eq!(dict_size_from_code(dict_size_code(size)), Ok(size));
        }
        assert_eq!(dict_size_from_code(11), Err(Error::DictSizeUnsupported));
        assert_eq!(dict_size_from_code(31), Err(Error::DictSizeUnsupported));
        assert_eq!(dict_size_from_code(0x90), Err(Error::ReservedFlagSet));
    }

    #[test]
    fn preset_table_covers_all_presets() {
        for preset in 0..=PRESET_MAX {
            let dict = preset_dict_size(preset).expect("preset in range");
            assert!(dict.is_power_of_two());
            assert!(dict >= DICT_SIZE_MIN && dict <= DICT_SIZE_MAX);
        }
        assert_eq!(preset_dict_size(PRESET_MAX + 1), None);
    }

    #[test]
    fn preset_dict_sizes_non_decreasing() {
        for pair in PRESET_DICT_SIZES.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn header_checksum_detects_single_bit_flips() {
        let flg = build_flg(Check::Xxh32, true);
        let bd = dict_size_code(1 << 20);
        let hc = header_checksum(flg, bd);
        assert_ne!(hc, header_checksum(flg ^ 0x40, bd));
        assert_ne!(hc, header_checksum(flg, bd ^ 0x01));
    }

    #[test]
    fn encode_bound_covers_degenerate_inputs() {
        let cfg = EncoderConfig::default();
        // Empty stream: header + end mark + digest.
        assert_eq!(
            encode_bound(0, &cfg).unwrap(),
            STREAM_HEADER_SIZE + BLOCK_HEADER_SIZE + 4
        );
        // One byte still pays a full block header.
        assert!(encode_bound(1, &cfg).unwrap() > encode_bound(0, &cfg).unwrap());
    }
}
