// prefs.rs — I/O-layer notification level and buffer-size constants.

use std::sync::atomic::{AtomicI32, Ordering};

// ---------------------------------------------------------------------------
// Numeric constants
// ---------------------------------------------------------------------------
pub const KB: usize = 1 << 10;
pub const MB: usize = 1 << 20;

// Output staging for the compressing writer.
pub const WRITER_BUFSIZE: usize = 256 * KB;

// Input refill buffer for the decompressing reader; decode-and-read wants a
// relatively large buffer.
pub const READER_BUFSIZE: usize = 512 * KB;

// Copy-loop chunk for the whole-file helpers.
pub const FILE_COPY_BUFSIZE: usize = MB;

// ---------------------------------------------------------------------------
// Display / notification globals
// ---------------------------------------------------------------------------

/// Global notification level.  0 = silent, 1 = errors only, 2 = results +
/// warnings, 3 = progress, 4+ = verbose.
pub static DISPLAY_LEVEL: AtomicI32 = AtomicI32::new(0);

/// Set the global notification level and return the new value.
pub fn set_notification_level(level: i32) -> i32 {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
    level
}

/// Write `msg` to stderr if the current notification level is ≥ `level`.
#[inline]
pub fn display_level(level: i32, msg: &str) {
    if DISPLAY_LEVEL.load(Ordering::Relaxed) >= level {
        eprint!("{}", msg);
        if DISPLAY_LEVEL.load(Ordering::Relaxed) >= 4 {
            use std::io::Write;
            let _ = std::io::stderr().flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_level_round_trips() {
        let previous = DISPLAY_LEVEL.load(Ordering::Relaxed);
        assert_eq!(set_notification_level(3), 3);
        assert_eq!(DISPLAY_LEVEL.load(Ordering::Relaxed), 3);
        set_notification_level(previous);
    }
}
