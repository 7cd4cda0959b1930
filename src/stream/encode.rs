//! Streaming encoder.
//!
//! Input bytes accumulate in a window of one block size; a full window (or a
//! [`Action::Finish`] flush) sends the block through the codec and appends
//! the result to an internal pending buffer.  Every `process` call drains
//! pending bytes into the caller's output *first*, so output staged by an
//! earlier call is never lost when capacity runs short — emission simply
//! resumes on the next call.

use crate::codec::{compress_block, MatchTable};
use crate::stream::header::{
    block_size_for, build_flg, dict_size_code, header_checksum, resolve_dict_size,
    BLOCK_STORED_FLAG, END_MARK, STREAM_MAGIC,
};
use crate::stream::types::{Action, Check, ContentHasher, EncoderConfig, Error, Status};
use crate::xxhash::xxh32_oneshot;

/// Streaming compression context.
///
/// Owned exclusively by the handle that allocated it; dropped on teardown or
/// on the transition into the ended/failed modes.
pub struct Encoder {
    block_size: usize,
    check: Check,
    block_checksums: bool,
    /// Input accumulation window; capacity is exactly one block.
    window: Vec<u8>,
    /// Codec output staging for the current block.
    scratch: Vec<u8>,
    table: MatchTable,
    /// Emitted-but-unflushed output (header, blocks, trailer).
    pending: Vec<u8>,
    pending_pos: usize,
    hasher: ContentHasher,
    /// The end mark and trailer have been staged; nothing more to emit.
    finished: bool,
}

fn reserve_exact(v: &mut Vec<u8>, additional: usize) -> Result<(), Error> {
    v.try_reserve_exact(additional)
        .map_err(|_| Error::AllocationFailed)
}

impl Encoder {
    /// Validate `cfg`, allocate the working buffers, and stage the stream
    /// header so the first `process` call emits it.
    pub fn new(cfg: &EncoderConfig) -> Result<Box<Encoder>, Error> {
        let dict_size = resolve_dict_size(cfg)?;
        let block_size = block_size_for(dict_size);

        let mut window = Vec::new();
        reserve_exact(&mut window, block_size)?;
        let mut scratch = Vec::new();
        reserve_exact(&mut scratch, block_size)?;
        scratch.resize(block_size, 0);

        // Pending holds at most one emitted block plus framing.
        let mut pending = Vec::new();
        reserve_exact(&mut pending, block_size + 32)?;

        let flg = build_flg(cfg.check, cfg.block_checksums);
        let bd = dict_size_code(dict_size);
        pending.extend_from_slice(&STREAM_MAGIC.to_le_bytes());
        pending.extend_from_slice(&[flg, bd, header_checksum(flg, bd)]);

        Ok(Box::new(Encoder {
            block_size,
            check: cfg.check,
            block_checksums: cfg.block_checksums,
            window,
            scratch,
            table: MatchTable::new(),
            pending,
            pending_pos: 0,
            hasher: ContentHasher::new(cfg.check),
            finished: false,
        }))
    }

    /// Advance the encoder.  Returns `(consumed, produced, status)`.
    pub fn process(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        action: Action,
    ) -> Result<(usize, usize, Status), Error> {
        let mut src_pos = 0usize;
        let mut dst_pos = 0usize;

        loop {
            // Drain pending output before anything else.
            if self.pending_pos < self.pending.len() {
                let n = (self.pending.len() - self.pending_pos).min(dst.len() - dst_pos);
                dst[dst_pos..dst_pos + n]
                    .copy_from_slice(&self.pending[self.pending_pos..self.pending_pos + n]);
                dst_pos += n;
                self.pending_pos += n;
                if self.pending_pos < self.pending.len() {
                    return Ok((src_pos, dst_pos, Status::OutputReady));
                }
                self.pending.clear();
                self.pending_pos = 0;
            }

            if self.finished {
                return Ok((src_pos, dst_pos, Status::StreamEnded));
            }

            // Accumulate input into the window.
            let want = self.block_size - self.window.len();
            let take = want.min(src.len() - src_pos);
            if take > 0 {
                self.window.extend_from_slice(&src[src_pos..src_pos + take]);
                self.hasher.update(&src[src_pos..src_pos + take]);
                src_pos += take;
            }

            if self.window.len() == self.block_size {
                self.emit_block();
                continue;
            }

            // Input exhausted with a partial (possibly empty) window.
            match action {
                Action::Finish => {
                    if !self.window.is_empty() {
                        self.emit_block();
                    }
                    self.emit_trailer();
                    self.finished = true;
                    // Loop back to drain what was just staged.
                }
                Action::Run => return Ok((src_pos, dst_pos, Status::NeedsMoreInput)),
            }
        }
    }

    /// Code the window into pending; store it raw when coding does not
    /// shrink it.
    fn emit_block(&mut self) {
        let raw_len = self.window.len();
        debug_assert!(raw_len > 0);

        let probe_cap = raw_len - 1;
        let c_size = compress_block(
            &self.window,
            &mut self.scratch[..probe_cap],
            &mut self.table,
        );

        let (bh, payload): (u32, &[u8]) = if c_size == 0 {
            ((raw_len as u32) | BLOCK_STORED_FLAG, &self.window)
        } else {
            (c_size as u32, &self.scratch[..c_size])
        };
        self.pending.extend_from_slice(&bh.to_le_bytes());
        self.pending.extend_from_slice(payload);
        if self.block_checksums {
            self.pending
                .extend_from_slice(&xxh32_oneshot(payload, 0).to_le_bytes());
        }
        self.window.clear();
    }

    /// Stage the end mark and the content-check digest.
    fn emit_trailer(&mut self) {
        self.pending.extend_from_slice(&END_MARK.to_le_bytes());
        let (digest, len) = self.hasher.digest_bytes();
        self.pending.extend_from_slice(&digest[..len]);
        debug_assert_eq!(len, self.check.digest_len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::header::{BLOCK_HEADER_SIZE, STREAM_HEADER_SIZE};

    #[test]
    fn empty_finish_emits_header_and_trailer_only() {
        let mut enc = Encoder::new(&EncoderConfig::default()).expect("init");
        let mut dst = [0u8; 64];
        let (consumed, produced, status) =
            enc.process(&[], &mut dst, Action::Finish).expect("process");
        assert_eq!(consumed, 0);
        assert_eq!(status, Status::StreamEnded);
        // header + end mark + xxh32 digest
        assert_eq!(produced, STREAM_HEADER_SIZE + BLOCK_HEADER_SIZE + 4);
    }

    #[test]
    fn zero_capacity_output_produces_nothing() {
        let mut enc = Encoder::new(&EncoderConfig::default()).expect("init");
        let mut dst = [0u8; 0];
        let (consumed, produced, status) = enc
            .process(b"hello world", &mut dst, Action::Finish)
            .expect("process");
        assert_eq!(consumed, 11);
        assert_eq!(produced, 0);
        assert_eq!(status, Status::OutputReady);
    }

    #[test]
    fn pending_survives_tiny_output_buffers() {
        let mut enc = Encoder::new(&EncoderConfig::default()).expect("init");
        let mut all = Vec::new();
        let mut dst = [0u8; 3];
        let mut fed = false;
        loop {
            let input: &[u8] = if fed { &[] } else { b"hello world" };
            let (consumed, produced, status) =
                enc.process(input, &mut dst, Action::Finish).expect("process");
            if consumed == input.len() {
                fed = true;
            }
            all.extend_from_slice(&dst[..produced]);
            if status == Status::StreamEnded {
                break;
            }
        }
        // Identical to the single-call encoding.
        let mut enc2 = Encoder::new(&EncoderConfig::default()).expect("init");
        let mut big = vec![0u8; 256];
        let (_, produced, status) = enc2
            .process(b"hello world", &mut big, Action::Finish)
            .expect("process");
        assert_eq!(status, Status::StreamEnded);
        assert_eq!(all, &big[..produced]);
    }

    #[test]
    fn run_without_finish_reports_needs_more_input() {
        let mut enc = Encoder::new(&EncoderConfig::default()).expect("init");
        let mut dst = [0u8; 256];
        let (consumed, _, status) = enc.process(b"abc", &mut dst, Action::Run).expect("process");
        assert_eq!(consumed, 3);
        assert_eq!(status, Status::NeedsMoreInput);
    }

    #[test]
    fn bad_configs_rejected_at_init() {
        let cfg = EncoderConfig {
            preset: 10,
            ..EncoderConfig::default()
        };
        assert!(matches!(Encoder::new(&cfg), Err(Error::PresetInvalid)));

        let cfg = EncoderConfig {
            dict_size: 12345, // not a power of two
            ..EncoderConfig::default()
        };
        assert!(matches!(Encoder::new(&cfg), Err(Error::DictSizeInvalid)));

        let cfg = EncoderConfig {
            dict_size: 1 << 31, // above the platform ceiling
            ..EncoderConfig::default()
        };
        assert!(matches!(Encoder::new(&cfg), Err(Error::DictSizeInvalid)));
    }
}
