//! The stream engine — incremental compression and decompression behind a
//! single caller-driven handle.

pub mod decode;
pub mod encode;
pub mod handle;
pub mod header;
pub mod oneshot;
pub mod types;

// Re-export the public API surface at the module level.
pub use handle::Stream;
pub use oneshot::{decode_bytes, encode_bytes};
pub use types::{
    Action, Check, DecoderConfig, EncoderConfig, Error, ErrorKind, Mode, MtConfig, Processed,
    Status,
};
