//! Public I/O surface: stream adapters, whole-file helpers, and the
//! notification-level plumbing they share.

pub mod file;
pub mod prefs;
pub mod reader;
pub mod writer;

// ── Core re-exports ──────────────────────────────────────────────────────────
pub use file::{compress_file, decompress_file};
pub use reader::XzrReader;
pub use writer::XzrWriter;

// ── Notification level (global) ──────────────────────────────────────────────
pub use prefs::{display_level, set_notification_level};
