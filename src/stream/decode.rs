//! Streaming decoder.
//!
//! A staged state machine in the classic incremental-decoder shape: each
//! stage either completes from the bytes available this call or parks its
//! partial progress in a staging buffer and suspends.  Small fixed-size
//! fields (headers, checksums, the trailer) stage through `field_buf`;
//! coded block payloads that straddle call boundaries stage through
//! `tmp_in`; decoded blocks that do not fit the caller's output stage
//! through `tmp_out` and drain via the flush stage.
//!
//! Malformed input is a hard error — never tolerated, never "best effort".
//! Truncation is only an error once [`Action::Finish`] asserts that no more
//! input exists.

use crate::codec::decompress_block;
use crate::stream::header::{
    block_size_for, coded_payload_limit, dict_size_from_code, header_checksum, parse_flg,
    read_le32, BLOCK_CHECK_SIZE, BLOCK_HEADER_SIZE, BLOCK_STORED_FLAG, END_MARK,
    STREAM_HEADER_SIZE, STREAM_MAGIC,
};
use crate::stream::types::{Action, Check, ContentHasher, DecoderConfig, Error, Status};
use crate::xxhash::{xxh32_oneshot, Xxh32State};

/// Staging capacity for small fixed-size fields (the largest is the 8-byte
/// XXH64 trailer).
const FIELD_BUF_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeStage {
    /// Collect and validate the 7-byte stream header.
    ReadStreamHeader,
    /// Collect the next 4-byte block header (or end mark).
    ReadBlockHeader,
    /// Copy a stored block straight from input to output.
    CopyStored,
    /// Collect and verify a stored block's trailing checksum.
    ReadBlockChecksum,
    /// A coded payload is announced; decode it straight from input if it is
    /// fully available.
    GetCodedBlock,
    /// Coded payload straddles calls; accumulate it in `tmp_in`.
    StoreCodedBlock,
    /// Drain a decoded block from `tmp_out` into the caller's output.
    FlushOut,
    /// Collect and verify the content-check trailer.
    ReadTrailer,
    /// Stream complete (non-concatenated mode only).
    Done,
}

/// Streaming decompression context.
pub struct Decoder {
    cfg: DecoderConfig,
    stage: DecodeStage,

    /// Staging for headers, block checksums, and the trailer.
    field_buf: [u8; FIELD_BUF_SIZE],
    field_size: usize,
    field_target: usize,

    // Parameters learned from the current stream header.
    check: Check,
    block_checksums: bool,
    block_size: usize,

    /// Staged coded payload (plus its checksum when present).
    tmp_in: Vec<u8>,
    tmp_in_size: usize,
    /// Bytes expected for the current block: payload (+ checksum) for coded
    /// blocks, remaining raw bytes for stored blocks.
    tmp_in_target: usize,

    /// Decoded block awaiting flush.
    tmp_out: Vec<u8>,
    tmp_out_size: usize,
    tmp_out_start: usize,

    content_hasher: ContentHasher,
    /// Incremental checksum over a stored block as it is copied.
    block_hasher: Xxh32State,

    /// Streams fully decoded so far (concatenated mode may see several).
    streams_done: u32,
}

fn grow_zeroed(v: &mut Vec<u8>, len: usize) -> Result<(), Error> {
    if v.len() < len {
        v.try_reserve_exact(len - v.len())
            .map_err(|_| Error::AllocationFailed)?;
        v.resize(len, 0);
    }
    Ok(())
}

impl Decoder {
    pub fn new(cfg: &DecoderConfig) -> Box<Decoder> {
        Box::new(Decoder {
            cfg: *cfg,
            stage: DecodeStage::ReadStreamHeader,
            field_buf: [0u8; FIELD_BUF_SIZE],
            field_size: 0,
            field_target: STREAM_HEADER_SIZE,
            check: Check::None,
            block_checksums: false,
            block_size: 0,
            tmp_in: Vec::new(),
            tmp_in_size: 0,
            tmp_in_target: 0,
            tmp_out: Vec::new(),
            tmp_out_size: 0,
            tmp_out_start: 0,
            content_hasher: ContentHasher::None,
            block_hasher: Xxh32State::new(0),
            streams_done: 0,
        })
    }

    /// Advance the decoder.  Returns `(consumed, produced, status)`.
    pub fn process(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        action: Action,
    ) -> Result<(usize, usize, Status), Error> {
        let mut src_pos = 0usize;
        let mut dst_pos = 0usize;

        loop {
            match self.stage {
                // ── ReadStreamHeader ─────────────────────────────────────────
                DecodeStage::ReadStreamHeader => {
                    if !self.fill_field(src, &mut src_pos) {
                        return self.suspend_for_input(src_pos, dst_pos, action);
                    }
                    let header = self.field_buf;
                    self.parse_stream_header(&header[..STREAM_HEADER_SIZE])?;
                }

                // ── ReadBlockHeader ──────────────────────────────────────────
                DecodeStage::ReadBlockHeader => {
                    if !self.fill_field(src, &mut src_pos) {
                        return self.suspend_for_input(src_pos, dst_pos, action);
                    }
                    let bh = read_le32(&self.field_buf, 0);
                    self.begin_block(bh)?;
                }

                // ── CopyStored ───────────────────────────────────────────────
                DecodeStage::CopyStored => {
                    let n = self
                        .tmp_in_target
                        .min(src.len() - src_pos)
                        .min(dst.len() - dst_pos);
                    if n > 0 {
                        dst[dst_pos..dst_pos + n].copy_from_slice(&src[src_pos..src_pos + n]);
                        if !self.cfg.skip_checksums {
                            if self.block_checksums {
                                self.block_hasher.update(&src[src_pos..src_pos + n]);
                            }
                            self.content_hasher.update(&src[src_pos..src_pos + n]);
                        }
                        src_pos += n;
                        dst_pos += n;
                        self.tmp_in_target -= n;
                    }
                    if self.tmp_in_target == 0 {
                        if self.block_checksums {
                            self.enter_field(DecodeStage::ReadBlockChecksum, BLOCK_CHECK_SIZE);
                        } else {
                            self.enter_field(DecodeStage::ReadBlockHeader, BLOCK_HEADER_SIZE);
                        }
                        continue;
                    }
                    if src_pos == src.len() {
                        return self.suspend_for_input(src_pos, dst_pos, action);
                    }
                    return Ok((src_pos, dst_pos, Status::OutputReady));
                }

                // ── ReadBlockChecksum ────────────────────────────────────────
                DecodeStage::ReadBlockChecksum => {
                    if !self.fill_field(src, &mut src_pos) {
                        return self.suspend_for_input(src_pos, dst_pos, action);
                    }
                    let want = read_le32(&self.field_buf, 0);
                    if !self.cfg.skip_checksums && want != self.block_hasher.digest() {
                        return Err(Error::BlockChecksumInvalid);
                    }
                    self.enter_field(DecodeStage::ReadBlockHeader, BLOCK_HEADER_SIZE);
                }

                // ── GetCodedBlock ────────────────────────────────────────────
                DecodeStage::GetCodedBlock => {
                    let avail = src.len() - src_pos;
                    if avail >= self.tmp_in_target {
                        // Whole payload present — decode straight from src.
                        let total = self.tmp_in_target;
                        let payload_len = self.payload_len(total);
                        let start = src_pos;
                        self.verify_block_checksum(&src[start..start + total], payload_len)?;
                        src_pos += total;
                        self.decode_payload(&src[start..start + payload_len], dst, &mut dst_pos)?;
                    } else {
                        self.tmp_in_size = 0;
                        self.stage = DecodeStage::StoreCodedBlock;
                    }
                }

                // ── StoreCodedBlock ──────────────────────────────────────────
                DecodeStage::StoreCodedBlock => {
                    let want = self.tmp_in_target - self.tmp_in_size;
                    let take = want.min(src.len() - src_pos);
                    self.tmp_in[self.tmp_in_size..self.tmp_in_size + take]
                        .copy_from_slice(&src[src_pos..src_pos + take]);
                    self.tmp_in_size += take;
                    src_pos += take;
                    if self.tmp_in_size < self.tmp_in_target {
                        return self.suspend_for_input(src_pos, dst_pos, action);
                    }
                    let total = self.tmp_in_target;
                    let payload_len = self.payload_len(total);
                    let staged = core::mem::take(&mut self.tmp_in);
                    let mut result = self.verify_block_checksum(&staged[..total], payload_len);
                    if result.is_ok() {
                        result = self.decode_payload(&staged[..payload_len], dst, &mut dst_pos);
                    }
                    self.tmp_in = staged;
                    result?;
                }

                // ── FlushOut ─────────────────────────────────────────────────
                DecodeStage::FlushOut => {
                    let n = (self.tmp_out_size - self.tmp_out_start).min(dst.len() - dst_pos);
                    dst[dst_pos..dst_pos + n].copy_from_slice(
                        &self.tmp_out[self.tmp_out_start..self.tmp_out_start + n],
                    );
                    dst_pos += n;
                    self.tmp_out_start += n;
                    if self.tmp_out_start == self.tmp_out_size {
                        self.enter_field(DecodeStage::ReadBlockHeader, BLOCK_HEADER_SIZE);
                        continue;
                    }
                    return Ok((src_pos, dst_pos, Status::OutputReady));
                }

                // ── ReadTrailer ──────────────────────────────────────────────
                DecodeStage::ReadTrailer => {
                    if !self.fill_field(src, &mut src_pos) {
                        return self.suspend_for_input(src_pos, dst_pos, action);
                    }
                    let target = self.field_target;
                    if !self.cfg.skip_checksums
                        && !self.content_hasher.verify(&self.field_buf[..target])
                    {
                        return Err(Error::ContentChecksumInvalid);
                    }
                    self.finish_stream();
                }

                // ── Done ─────────────────────────────────────────────────────
                DecodeStage::Done => {
                    return Ok((src_pos, dst_pos, Status::StreamEnded));
                }
            }
        }
    }

    // ── Stage helpers ────────────────────────────────────────────────────────

    /// Copy bytes from `src` into the field staging buffer; `true` once the
    /// target length is fully staged.
    fn fill_field(&mut self, src: &[u8], src_pos: &mut usize) -> bool {
        let want = self.field_target - self.field_size;
        let take = want.min(src.len() - *src_pos);
        self.field_buf[self.field_size..self.field_size + take]
            .copy_from_slice(&src[*src_pos..*src_pos + take]);
        self.field_size += take;
        *src_pos += take;
        self.field_size == self.field_target
    }

    /// Arm the field staging buffer and switch stage.
    fn enter_field(&mut self, stage: DecodeStage, target: usize) {
        debug_assert!(target <= FIELD_BUF_SIZE);
        self.stage = stage;
        self.field_size = 0;
        self.field_target = target;
    }

    /// Resolve a suspension caused by exhausted input.  Under `Finish` an
    /// incomplete stream is a hard error — except at a clean boundary between
    /// concatenated streams, which is the regular end of input.
    fn suspend_for_input(
        &self,
        consumed: usize,
        produced: usize,
        action: Action,
    ) -> Result<(usize, usize, Status), Error> {
        if action == Action::Finish {
            if self.at_stream_boundary() {
                return Ok((consumed, produced, Status::StreamEnded));
            }
            return Err(Error::TruncatedStream);
        }
        Ok((consumed, produced, Status::NeedsMoreInput))
    }

    /// True when at least one stream finished and no byte of a follow-up
    /// stream has been read.
    fn at_stream_boundary(&self) -> bool {
        self.stage == DecodeStage::ReadStreamHeader && self.field_size == 0 && self.streams_done > 0
    }

    // ── Header / block parsing ───────────────────────────────────────────────

    fn parse_stream_header(&mut self, header: &[u8]) -> Result<(), Error> {
        if read_le32(header, 0) != STREAM_MAGIC {
            return Err(Error::FormatUnknown);
        }
        let flg = header[4];
        let bd = header[5];
        if header_checksum(flg, bd) != header[6] {
            return Err(Error::HeaderChecksumInvalid);
        }
        let (check, block_checksums) = parse_flg(flg)?;
        let dict_size = dict_size_from_code(bd)?;
        let block_size = block_size_for(dict_size);

        // The whole buffer budget is known now; refuse it up front rather
        // than failing halfway through a block.
        let budget = (block_size + coded_payload_limit(block_size) + BLOCK_CHECK_SIZE) as u64;
        if budget > self.cfg.memlimit {
            return Err(Error::MemLimitExceeded);
        }
        grow_zeroed(
            &mut self.tmp_in,
            coded_payload_limit(block_size) + BLOCK_CHECK_SIZE,
        )?;
        grow_zeroed(&mut self.tmp_out, block_size)?;

        self.check = check;
        self.block_checksums = block_checksums;
        self.block_size = block_size;
        self.content_hasher = ContentHasher::new(check);
        self.enter_field(DecodeStage::ReadBlockHeader, BLOCK_HEADER_SIZE);
        Ok(())
    }

    fn begin_block(&mut self, bh: u32) -> Result<(), Error> {
        if bh == END_MARK {
            let digest_len = self.check.digest_len();
            if digest_len == 0 {
                self.finish_stream();
            } else {
                self.enter_field(DecodeStage::ReadTrailer, digest_len);
            }
            return Ok(());
        }

        let stored = bh & BLOCK_STORED_FLAG != 0;
        let size = (bh & !BLOCK_STORED_FLAG) as usize;
        if size == 0 {
            return Err(Error::PayloadMalformed);
        }
        if stored {
            if size > self.block_size {
                return Err(Error::BlockOversized);
            }
            self.block_hasher = Xxh32State::new(0);
            self.tmp_in_target = size;
            self.stage = DecodeStage::CopyStored;
        } else {
            if size > coded_payload_limit(self.block_size) {
                return Err(Error::BlockOversized);
            }
            self.tmp_in_target = size
                + if self.block_checksums {
                    BLOCK_CHECK_SIZE
                } else {
                    0
                };
            self.stage = DecodeStage::GetCodedBlock;
        }
        Ok(())
    }

    /// Payload length within a captured coded-block region (which carries the
    /// block checksum at its tail when enabled).
    fn payload_len(&self, total: usize) -> usize {
        if self.block_checksums {
            total - BLOCK_CHECK_SIZE
        } else {
            total
        }
    }

    fn verify_block_checksum(&self, region: &[u8], payload_len: usize) -> Result<(), Error> {
        if self.block_checksums && !self.cfg.skip_checksums {
            let want = read_le32(region, payload_len);
            if want != xxh32_oneshot(&region[..payload_len], 0) {
                return Err(Error::BlockChecksumInvalid);
            }
        }
        Ok(())
    }

    /// Decode a complete coded payload: straight into the caller's output
    /// when a full block fits, otherwise into `tmp_out` for staged flushing.
    fn decode_payload(
        &mut self,
        payload: &[u8],
        dst: &mut [u8],
        dst_pos: &mut usize,
    ) -> Result<(), Error> {
        let block_size = self.block_size;
        let dst_avail = dst.len() - *dst_pos;

        if dst_avail >= block_size {
            let out = &mut dst[*dst_pos..*dst_pos + block_size];
            let n = decompress_block(payload, out).map_err(|_| Error::PayloadMalformed)?;
            if !self.cfg.skip_checksums {
                self.content_hasher.update(&out[..n]);
            }
            *dst_pos += n;
            self.enter_field(DecodeStage::ReadBlockHeader, BLOCK_HEADER_SIZE);
        } else {
            let n = decompress_block(payload, &mut self.tmp_out[..block_size])
                .map_err(|_| Error::PayloadMalformed)?;
            if !self.cfg.skip_checksums {
                self.content_hasher.update(&self.tmp_out[..n]);
            }
            self.tmp_out_size = n;
            self.tmp_out_start = 0;
            self.stage = DecodeStage::FlushOut;
        }
        Ok(())
    }

    /// One stream fully decoded; rearm for a follow-up stream or settle into
    /// the terminal stage.
    fn finish_stream(&mut self) {
        self.streams_done += 1;
        if self.cfg.concatenated {
            self.content_hasher.reset();
            self.enter_field(DecodeStage::ReadStreamHeader, STREAM_HEADER_SIZE);
        } else {
            self.stage = DecodeStage::Done;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::encode::Encoder;
    use crate::stream::types::EncoderConfig;

    fn encode_all(data: &[u8], cfg: &EncoderConfig) -> Vec<u8> {
        let mut enc = Encoder::new(cfg).expect("init");
        let mut out = vec![0u8; crate::stream::header::encode_bound(data.len(), cfg).unwrap()];
        let (consumed, produced, status) =
            enc.process(data, &mut out, Action::Finish).expect("encode");
        assert_eq!(consumed, data.len());
        assert_eq!(status, Status::StreamEnded);
        out.truncate(produced);
        out
    }

    #[test]
    fn byte_at_a_time_input_round_trips() {
        let data: Vec<u8> = b"stream me in the smallest possible pieces "
            .iter()
            .copied()
            .cycle()
            .take(300)
            .collect();
        let encoded = encode_all(&data, &EncoderConfig::default());

        let mut dec = Decoder::new(&DecoderConfig::default());
        let mut out = vec![0u8; data.len() + 16];
        let mut out_pos = 0usize;
        for (i, byte) in encoded.iter().enumerate() {
            let last = i + 1 == encoded.len();
            let action = if last { Action::Finish } else { Action::Run };
            let (consumed, produced, status) = dec
                .process(&[*byte], &mut out[out_pos..], action)
                .expect("decode");
            assert_eq!(consumed, 1);
            out_pos += produced;
            if last {
                assert_eq!(status, Status::StreamEnded);
            }
        }
        assert_eq!(&out[..out_pos], &data[..]);
    }

    #[test]
    fn byte_at_a_time_output_round_trips() {
        let data: Vec<u8> = (0..500u32).map(|i| (i % 7) as u8).collect();
        let encoded = encode_all(&data, &EncoderConfig::default());

        let mut dec = Decoder::new(&DecoderConfig::default());
        let mut out = Vec::new();
        let mut src_pos = 0usize;
        loop {
            let mut byte = [0u8; 1];
            let (consumed, produced, status) = dec
                .process(&encoded[src_pos..], &mut byte, Action::Finish)
                .expect("decode");
            src_pos += consumed;
            out.extend_from_slice(&byte[..produced]);
            if status == Status::StreamEnded {
                break;
            }
        }
        assert_eq!(out, data);
    }

    #[test]
    fn truncated_input_needs_more_without_finish() {
        let encoded = encode_all(b"hello world", &EncoderConfig::default());
        let cut = &encoded[..encoded.len() - 3];

        let mut dec = Decoder::new(&DecoderConfig::default());
        let mut out = vec![0u8; 64];
        let (consumed, _, status) = dec.process(cut, &mut out, Action::Run).expect("decode");
        assert_eq!(consumed, cut.len());
        assert_eq!(status, Status::NeedsMoreInput);
    }

    #[test]
    fn truncated_input_fails_under_finish() {
        let encoded = encode_all(b"hello world", &EncoderConfig::default());
        let cut = &encoded[..encoded.len() - 3];

        let mut dec = Decoder::new(&DecoderConfig::default());
        let mut out = vec![0u8; 64];
        assert_eq!(
            dec.process(cut, &mut out, Action::Finish).unwrap_err(),
            Error::TruncatedStream
        );
    }

    #[test]
    fn concatenated_streams_decode_back_to_back() {
        let mut joined = encode_all(b"first stream ", &EncoderConfig::default());
        joined.extend_from_slice(&encode_all(b"second stream", &EncoderConfig::default()));

        let cfg = DecoderConfig {
            concatenated: true,
            ..DecoderConfig::default()
        };
        let mut dec = Decoder::new(&cfg);
        let mut out = vec![0u8; 128];
        let (consumed, produced, status) = dec
            .process(&joined, &mut out, Action::Finish)
            .expect("decode");
        assert_eq!(consumed, joined.len());
        assert_eq!(status, Status::StreamEnded);
        assert_eq!(&out[..produced], b"first stream second stream");
    }

    #[test]
    fn memlimit_rejects_large_dictionaries() {
        let encoded = encode_all(b"x", &EncoderConfig::default());
        let cfg = DecoderConfig {
            memlimit: 1024,
            ..DecoderConfig::default()
        };
        let mut dec = Decoder::new(&cfg);
        let mut out = vec![0u8; 64];
        assert_eq!(
            dec.process(&encoded, &mut out, Action::Finish).unwrap_err(),
            Error::MemLimitExceeded
        );
    }
}
