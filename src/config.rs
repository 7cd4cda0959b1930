// config.rs — Compile-time configuration constants.

// Default compression preset.
// Presets trade encode time against ratio; 6 is the conventional middle
// ground and the value used when EncoderConfig::default() is left untouched.
pub const PRESET_DEFAULT: u32 = 6;

// Highest accepted compression preset.
pub const PRESET_MAX: u32 = 9;

// Smallest accepted dictionary size (4 KiB).  Smaller dictionaries leave the
// match finder with nothing to work on.
pub const DICT_SIZE_MIN: u32 = 1 << 12;

// Largest accepted dictionary size (1 GiB).  This is the platform ceiling:
// configurations above it fail at init time, never at process time.
pub const DICT_SIZE_MAX: u32 = 1 << 30;

// Per-block accumulation window clamp.  The dictionary size picks the block
// size within these bounds; buffers on both the encode and decode side are
// proportional to it.
pub const BLOCK_SIZE_MIN: usize = 64 * 1024;
pub const BLOCK_SIZE_MAX: usize = 4 * 1024 * 1024;

// Maximum number of worker threads a multi-threaded configuration may request.
// The descriptor is validated against this ceiling even though no worker pool
// is spawned by this crate.
pub const NB_WORKERS_MAX: u32 = 256;
