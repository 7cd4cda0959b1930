//! Stream engine types, configuration, and error handling.
//!
//! Covers:
//! - Public enums: [`Status`], [`Action`], [`Check`], [`Mode`]
//! - [`EncoderConfig`] / [`DecoderConfig`] structs
//! - [`MtConfig`] — multi-threaded configuration descriptor (layout +
//!   validation only; this crate spawns no workers)
//! - [`Error`] with `error_name()`, [`ErrorKind`] taxonomy, `Display` +
//!   `Error` impls
//! - [`Processed`] — the per-call result of `Stream::process`

use core::fmt;

use crate::config::{DICT_SIZE_MAX, DICT_SIZE_MIN, NB_WORKERS_MAX, PRESET_DEFAULT, PRESET_MAX};
use crate::xxhash::{Xxh32State, Xxh64State};

// ─────────────────────────────────────────────────────────────────────────────
// Status / Action
// ─────────────────────────────────────────────────────────────────────────────

/// Non-error outcome of a `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// All supplied input was consumed and the engine is waiting for more.
    NeedsMoreInput,
    /// Output is pending inside the engine; supply more output capacity.
    OutputReady,
    /// The stream is complete; no further input or output will be processed.
    StreamEnded,
}

/// Flush directive supplied to every `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Keep the stream open: buffer freely, expect more input later.
    #[default]
    Run,
    /// No more input will ever arrive; drive the stream to its end.
    Finish,
}

// ─────────────────────────────────────────────────────────────────────────────
// Check
// ─────────────────────────────────────────────────────────────────────────────

/// Integrity check appended to each stream (and the id stored in the header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum Check {
    /// No content checksum.
    None = 0,
    /// 32-bit XXH32 content checksum (default).
    #[default]
    Xxh32 = 1,
    /// 64-bit XXH64 content checksum.
    Xxh64 = 2,
}

impl Check {
    /// Two-bit id stored in the stream header FLG byte.
    #[inline]
    pub fn wire_id(self) -> u8 {
        self as u32 as u8
    }

    /// Byte length of the trailer digest for this check.
    #[inline]
    pub fn digest_len(self) -> usize {
        match self {
            Check::None => 0,
            Check::Xxh32 => 4,
            Check::Xxh64 => 8,
        }
    }

    /// Inverse of [`Check::wire_id`]; `None` for reserved ids.
    pub fn from_wire_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Check::None),
            1 => Some(Check::Xxh32),
            2 => Some(Check::Xxh64),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mode
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle mode of a stream handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Freshly created or torn down; no internal state is allocated.
    #[default]
    Idle,
    /// Initialized for compression.
    Encoding,
    /// Initialized for decompression.
    Decoding,
    /// The stream completed cleanly; only teardown is permitted.
    Ended,
    /// An unrecoverable error occurred; only teardown is permitted.
    Failed,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Encoder initialization parameters.
///
/// Validated once at `init_encoder`; `process` never re-checks them.
#[derive(Debug, Clone, Copy)]
pub struct EncoderConfig {
    /// Compression preset, `0..=9`.  Picks the dictionary size when
    /// `dict_size` is 0.
    pub preset: u32,
    /// Dictionary size in bytes; 0 derives it from `preset`, otherwise it
    /// must be a power of two within the platform floor/ceiling.
    pub dict_size: u32,
    /// Content check appended to the stream trailer.
    pub check: Check,
    /// Append an XXH32 checksum after every block payload.
    pub block_checksums: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            preset: PRESET_DEFAULT,
            dict_size: 0,
            check: Check::default(),
            block_checksums: false,
        }
    }
}

/// Decoder initialization parameters.
#[derive(Debug, Clone, Copy)]
pub struct DecoderConfig {
    /// Ceiling on decoder buffer memory, in bytes.  A stream whose
    /// dictionary would require more fails with `MemLimitExceeded`.
    pub memlimit: u64,
    /// Accept several back-to-back streams and report `StreamEnded` only at
    /// end of input under [`Action::Finish`].
    pub concatenated: bool,
    /// Skip all checksum verification (sticky for the handle's lifetime).
    pub skip_checksums: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            memlimit: u64::MAX,
            concatenated: false,
            skip_checksums: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MtConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Multi-threaded encoder configuration descriptor.
///
/// Exists for binary-layout introspection and parameter validation: embedding
/// applications verify `size_of_mt_config_descriptor()` against their own
/// builds.  This crate validates the fields but spawns no worker pool.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MtConfig {
    /// Requested worker count; clamped to the machine by
    /// [`MtConfig::effective_threads`].
    pub threads: u32,
    /// Bytes of input per worker unit; 0 = derive from the preset.
    pub block_size: u64,
    /// Milliseconds a worker may buffer before handing output back; 0 = no
    /// deadline.
    pub timeout_ms: u32,
    /// Compression preset, `0..=9`.
    pub preset: u32,
    /// Content check for the produced stream.
    pub check: Check,
}

impl Default for MtConfig {
    fn default() -> Self {
        MtConfig {
            threads: 1,
            block_size: 0,
            timeout_ms: 0,
            preset: PRESET_DEFAULT,
            check: Check::default(),
        }
    }
}

impl MtConfig {
    /// Validate the descriptor with the same rules `init_encoder` applies,
    /// plus the worker ceiling.
    pub fn validate(&self) -> Result<(), Error> {
        if self.threads == 0 || self.threads > NB_WORKERS_MAX {
            return Err(Error::ThreadsInvalid);
        }
        if self.preset > PRESET_MAX {
            return Err(Error::PresetInvalid);
        }
        if self.block_size != 0
            && (self.block_size < DICT_SIZE_MIN as u64 || self.block_size > DICT_SIZE_MAX as u64)
        {
            return Err(Error::BlockSizeInvalid);
        }
        Ok(())
    }

    /// Requested worker count clamped to the number of logical CPUs; asking
    /// for more threads than processors buys nothing.
    pub fn effective_threads(&self) -> u32 {
        let cpus = num_cpus::get().max(1) as u32;
        self.threads.min(cpus).max(1)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Processed
// ─────────────────────────────────────────────────────────────────────────────

/// Result of one `Stream::process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Processed {
    /// What the engine needs next.
    pub status: Status,
    /// Bytes consumed from the caller's input slice.
    pub consumed: usize,
    /// Bytes written to the caller's output slice.
    pub produced: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Coarse error taxonomy; every [`Error`] variant belongs to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid initialization parameters (detected at init, never at
    /// process time).
    Config,
    /// Malformed or corrupt input during decode, or a premature finish.
    Data,
    /// Allocation failure or memory-limit violation.
    Resource,
    /// Operation invoked from a state that forbids it.
    Usage,
}

/// Stream engine error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // ── Config ──
    /// Preset outside `0..=9`.
    PresetInvalid,
    /// Dictionary size not a power of two, or outside the platform bounds.
    DictSizeInvalid,
    /// Worker count is zero or above the ceiling.
    ThreadsInvalid,
    /// Multi-threaded block size outside the accepted range.
    BlockSizeInvalid,

    // ── Data ──
    /// Input does not start with a recognized stream header.
    FormatUnknown,
    /// The header declares a format version this build does not read.
    VersionUnsupported,
    /// A reserved header bit is set.
    ReservedFlagSet,
    /// Stream header checksum mismatch.
    HeaderChecksumInvalid,
    /// The header names a check id this build does not implement.
    CheckUnsupported,
    /// The header encodes a dictionary size outside the supported range.
    DictSizeUnsupported,
    /// A block declares a payload larger than the format allows.
    BlockOversized,
    /// Block checksum mismatch.
    BlockChecksumInvalid,
    /// Content checksum mismatch in the stream trailer.
    ContentChecksumInvalid,
    /// A coded block payload is structurally invalid.
    PayloadMalformed,
    /// `Finish` was asserted but the stream is incomplete.
    TruncatedStream,

    // ── Resource ──
    /// The stream's buffer budget exceeds the configured memory limit.
    MemLimitExceeded,
    /// An internal buffer allocation could not be satisfied.
    AllocationFailed,

    // ── Usage ──
    /// `process` called before `init_encoder` / `init_decoder`.
    NotInitialized,
    /// `init_*` called on a handle that is not idle.
    AlreadyInitialized,
    /// `process` called after the stream ended; tear down first.
    HandleEnded,
    /// `process` called after a fatal error; tear down first.
    HandleFailed,
}

impl Error {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PresetInvalid
            | Error::DictSizeInvalid
            | Error::ThreadsInvalid
            | Error::BlockSizeInvalid => ErrorKind::Config,

            Error::FormatUnknown
            | Error::VersionUnsupported
            | Error::ReservedFlagSet
            | Error::HeaderChecksumInvalid
            | Error::CheckUnsupported
            | Error::DictSizeUnsupported
            | Error::BlockOversized
            | Error::BlockChecksumInvalid
            | Error::ContentChecksumInvalid
            | Error::PayloadMalformed
            | Error::TruncatedStream => ErrorKind::Data,

            Error::MemLimitExceeded | Error::AllocationFailed => ErrorKind::Resource,

            Error::NotInitialized
            | Error::AlreadyInitialized
            | Error::HandleEnded
            | Error::HandleFailed => ErrorKind::Usage,
        }
    }

    /// Stable identifier string for logs and diagnostics.
    pub fn error_name(&self) -> &'static str {
        match self {
            Error::PresetInvalid => "ERROR_preset_invalid",
            Error::DictSizeInvalid => "ERROR_dictSize_invalid",
            Error::ThreadsInvalid => "ERROR_threads_invalid",
            Error::BlockSizeInvalid => "ERROR_blockSize_invalid",
            Error::FormatUnknown => "ERROR_format_unknown",
            Error::VersionUnsupported => "ERROR_version_unsupported",
            Error::ReservedFlagSet => "ERROR_reservedFlag_set",
            Error::HeaderChecksumInvalid => "ERROR_headerChecksum_invalid",
            Error::CheckUnsupported => "ERROR_check_unsupported",
            Error::DictSizeUnsupported => "ERROR_dictSize_unsupported",
            Error::BlockOversized => "ERROR_block_oversized",
            Error::BlockChecksumInvalid => "ERROR_blockChecksum_invalid",
            Error::ContentChecksumInvalid => "ERROR_contentChecksum_invalid",
            Error::PayloadMalformed => "ERROR_payload_malformed",
            Error::TruncatedStream => "ERROR_truncated_stream",
            Error::MemLimitExceeded => "ERROR_memLimit_exceeded",
            Error::AllocationFailed => "ERROR_allocation_failed",
            Error::NotInitialized => "ERROR_not_initialized",
            Error::AlreadyInitialized => "ERROR_already_initialized",
            Error::HandleEnded => "ERROR_handle_ended",
            Error::HandleFailed => "ERROR_handle_failed",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_name())
    }
}

impl std::error::Error for Error {}

// ─────────────────────────────────────────────────────────────────────────────
// Content hasher
// ─────────────────────────────────────────────────────────────────────────────

/// Running content checksum, selected by [`Check`].
pub(crate) enum ContentHasher {
    None,
    Xxh32(Xxh32State),
    Xxh64(Xxh64State),
}

impl ContentHasher {
    pub(crate) fn new(check: Check) -> Self {
        match check {
            Check::None => ContentHasher::None,
            Check::Xxh32 => ContentHasher::Xxh32(Xxh32State::new(0)),
            Check::Xxh64 => ContentHasher::Xxh64(Xxh64State::new(0)),
        }
    }

    pub(crate) fn reset(&mut self) {
        let fresh = match self {
            ContentHasher::None => ContentHasher::None,
            ContentHasher::Xxh32(_) => ContentHasher::Xxh32(Xxh32State::new(0)),
            ContentHasher::Xxh64(_) => ContentHasher::Xxh64(Xxh64State::new(0)),
        };
        *self = fresh;
    }

    pub(crate) fn update(&mut self, data: &[u8]) {
        match self {
            ContentHasher::None => {}
            ContentHasher::Xxh32(state) => state.update(data),
            ContentHasher::Xxh64(state) => state.update(data),
        }
    }

    /// Little-endian digest bytes plus their length (0, 4, or 8).
    pub(crate) fn digest_bytes(&self) -> ([u8; 8], usize) {
        let mut out = [0u8; 8];
        match self {
            ContentHasher::None => (out, 0),
            ContentHasher::Xxh32(state) => {
                out[..4].copy_from_slice(&state.digest().to_le_bytes());
                (out, 4)
            }
            ContentHasher::Xxh64(state) => {
                out.copy_from_slice(&state.digest().to_le_bytes());
                (out, 8)
            }
        }
    }

    /// Compare the running digest against trailer bytes read off the wire.
    pub(crate) fn verify(&self, trailer: &[u8]) -> bool {
        let (digest, len) = self.digest_bytes();
        trailer.len() == len && trailer == &digest[..len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_wire_ids_round_trip() {
        for check in [Check::None, Check::Xxh32, Check::Xxh64] {
            assert_eq!(Check::from_wire_id(check.wire_id()), Some(check));
        }
        assert_eq!(Check::from_wire_id(3), None);
    }

    #[test]
    fn check_digest_lengths() {
        assert_eq!(Check::None.digest_len(), 0);
        assert_eq!(Check::Xxh32.digest_len(), 4);
        assert_eq!(Check::Xxh64.digest_len(), 8);
    }

    #[test]
    fn error_kinds_cover_taxonomy() {
        assert_eq!(Error::PresetInvalid.kind(), ErrorKind::Config);
        assert_eq!(Error::ContentChecksumInvalid.kind(), ErrorKind::Data);
        assert_eq!(Error::TruncatedStream.kind(), ErrorKind::Data);
        assert_eq!(Error::MemLimitExceeded.kind(), ErrorKind::Resource);
        assert_eq!(Error::AllocationFailed.kind(), ErrorKind::Resource);
        assert_eq!(Error::NotInitialized.kind(), ErrorKind::Usage);
        assert_eq!(Error::HandleFailed.kind(), ErrorKind::Usage);
    }

    #[test]
    fn error_names_are_stable() {
        assert_eq!(Error::FormatUnknown.error_name(), "ERROR_format_unknown");
        assert_eq!(
            Error::ContentChecksumInvalid.error_name(),
            "ERROR_contentChecksum_invalid"
        );
        assert_eq!(Error::TruncatedStream.to_string(), "ERROR_truncated_stream");
    }

    #[test]
    fn mt_config_default_validates() {
        assert!(MtConfig::default().validate().is_ok());
    }

    #[test]
    fn mt_config_rejects_bad_fields() {
        let mut cfg = MtConfig {
            threads: 0,
            ..MtConfig::default()
        };
        assert_eq!(cfg.validate(), Err(Error::ThreadsInvalid));

        cfg.threads = NB_WORKERS_MAX + 1;
        assert_eq!(cfg.validate(), Err(Error::ThreadsInvalid));

        cfg.threads = 4;
        cfg.preset = PRESET_MAX + 1;
        assert_eq!(cfg.validate(), Err(Error::PresetInvalid));

        cfg.preset = PRESET_DEFAULT;
        cfg.block_size = 16;
        assert_eq!(cfg.validate(), Err(Error::BlockSizeInvalid));
    }

    #[test]
    fn effective_threads_clamped_to_machine() {
        let cfg = MtConfig {
            threads: u32::MAX,
            ..MtConfig::default()
        };
        let effective = cfg.effective_threads();
        assert!(effective >= 1);
        assert!(effective <= num_cpus::get() as u32);
    }

    #[test]
    fn content_hasher_verify_matches_digest() {
        let mut hasher = ContentHasher::new(Check::Xxh32);
        hasher.update(b"hello world");
        let (digest, len) = hasher.digest_bytes();
        assert_eq!(len, 4);
        assert!(hasher.verify(&digest[..len]));
        assert!(!hasher.verify(&[0u8; 4]));
        assert!(!hasher.verify(&digest[..3]));
    }
}
