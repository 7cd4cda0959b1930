//! Decompressing reader adapter.
//!
//! Wraps any [`Read`] source behind the streaming decoder: compressed bytes
//! are pulled from the source into a refill buffer, decoded output is handed
//! to the caller's `read` buffer.  End of the source asserts
//! [`Action::Finish`], so a truncated file surfaces as an error instead of a
//! silent short read.
//!
//! The default configuration accepts concatenated streams and sets no memory
//! limit, which is what reading a file produced by repeated appends wants.

use std::io::{self, Read};

use crate::io::prefs::READER_BUFSIZE;
use crate::io::writer::engine_err_to_io;
use crate::stream::{Action, DecoderConfig, Status, Stream};

/// Streaming decompression reader.
pub struct XzrReader<R: Read> {
    inner: R,
    stream: Stream,
    in_buf: Vec<u8>,
    in_pos: usize,
    in_len: usize,
    eof: bool,
    ended: bool,
}

impl<R: Read> XzrReader<R> {
    /// Create a reader with the file-oriented defaults: concatenated streams
    /// accepted, no memory limit, checksums verified.
    pub fn new(inner: R) -> io::Result<Self> {
        let cfg = DecoderConfig {
            concatenated: true,
            ..DecoderConfig::default()
        };
        Self::with_config(inner, &cfg)
    }

    /// Create a reader with an explicit decoder configuration.
    pub fn with_config(inner: R, cfg: &DecoderConfig) -> io::Result<Self> {
        let mut stream = Stream::new();
        stream.init_decoder(cfg).map_err(engine_err_to_io)?;
        Ok(XzrReader {
            inner,
            stream,
            in_buf: vec![0u8; READER_BUFSIZE],
            in_pos: 0,
            in_len: 0,
            eof: false,
            ended: false,
        })
    }

    /// Running `(bytes_in, bytes_out)` of the underlying stream.
    pub fn progress(&self) -> (u64, u64) {
        self.stream.progress()
    }

    /// Return the inner source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for XzrReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.ended || buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.in_pos == self.in_len && !self.eof {
                self.in_len = self.inner.read(&mut self.in_buf)?;
                self.in_pos = 0;
                if self.in_len == 0 {
                    self.eof = true;
                }
            }
            let action = if self.eof { Action::Finish } else { Action::Run };
            let r = self
                .stream
                .process(&self.in_buf[self.in_pos..self.in_len], buf, action)
                .map_err(engine_err_to_io)?;
            self.in_pos += r.consumed;
            if r.status == Status::StreamEnded {
                self.ended = true;
                return Ok(r.produced);
            }
            if r.produced > 0 {
                return Ok(r.produced);
            }
            // No output yet: loop to refill input or let Finish conclude.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{encode_bytes, EncoderConfig};

    #[test]
    fn reader_round_trips() {
        let data: Vec<u8> = b"reader adapter payload "
            .iter()
            .copied()
            .cycle()
            .take(50_000)
            .collect();
        let encoded = encode_bytes(&data, &EncoderConfig::default()).expect("encode");

        let mut reader = XzrReader::new(&encoded[..]).expect("new");
        let mut decoded = Vec::new();
        reader.read_to_end(&mut decoded).expect("read_to_end");
        assert_eq!(decoded, data);
    }

    #[test]
    fn reader_accepts_concatenated_sources() {
        let mut joined = encode_bytes(b"alpha ", &EncoderConfig::default()).expect("encode");
        joined.extend(encode_bytes(b"beta", &EncoderConfig::default()).expect("encode"));

        let mut reader = XzrReader::new(&joined[..]).expect("new");
        let mut decoded = Vec::new();
        reader.read_to_end(&mut decoded).expect("read_to_end");
        assert_eq!(&decoded[..], b"alpha beta");
    }

    #[test]
    fn truncated_source_is_an_error() {
        let encoded = encode_bytes(b"cut short", &EncoderConfig::default()).expect("encode");
        let cut = &encoded[..encoded.len() - 2];

        let mut reader = XzrReader::new(cut).expect("new");
        let mut decoded = Vec::new();
        let err = reader.read_to_end(&mut decoded).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn reads_after_end_return_zero() {
        let encoded = encode_bytes(b"x", &EncoderConfig::default()).expect("encode");
        let mut reader = XzrReader::new(&encoded[..]).expect("new");
        let mut decoded = Vec::new();
        reader.read_to_end(&mut decoded).expect("read_to_end");
        let mut byte = [0u8; 1];
        assert_eq!(reader.read(&mut byte).expect("read"), 0);
    }
}
