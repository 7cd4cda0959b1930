// xzr — streaming XZ-style compression engine

pub mod codec;
pub mod config;
pub mod io;
pub mod stream;
pub mod xxhash;

// ── Version constants ─────────────────────────────────────────────────────────
pub const XZR_VERSION_MAJOR: u32 = 0;
pub const XZR_VERSION_MINOR: u32 = 1;
pub const XZR_VERSION_RELEASE: u32 = 0;
pub const XZR_VERSION_NUMBER: u32 =
    XZR_VERSION_MAJOR * 100 * 100 + XZR_VERSION_MINOR * 100 + XZR_VERSION_RELEASE;
pub const XZR_VERSION_STRING: &str = "0.1.0";

/// Returns the runtime version number.
pub fn version_number() -> u32 {
    XZR_VERSION_NUMBER
}

/// Returns the runtime version string.
pub fn version_string() -> &'static str {
    XZR_VERSION_STRING
}

// ── Descriptor-size introspection ─────────────────────────────────────────────
//
// Exposed for binary-layout verification by embedding applications; neither
// function has any behavioural effect on the engine.

/// Returns the size in bytes of the [`Stream`] handle descriptor.
pub fn size_of_stream_descriptor() -> usize {
    core::mem::size_of::<stream::Stream>()
}

/// Returns the size in bytes of the [`MtConfig`] descriptor.
pub fn size_of_mt_config_descriptor() -> usize {
    core::mem::size_of::<stream::MtConfig>()
}

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use stream::{
    decode_bytes, encode_bytes, Action, Check, DecoderConfig, EncoderConfig, Error, ErrorKind,
    Mode, MtConfig, Processed, Status, Stream,
};
