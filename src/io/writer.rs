//! Compressing writer adapter.
//!
//! Wraps any [`Write`] sink behind the streaming encoder: bytes written to
//! the adapter enter the engine, engine output is forwarded to the sink.
//! [`XzrWriter::finish`] drives the stream to its end mark and returns the
//! sink; dropping an unfinished writer finishes best-effort (errors on the
//! drop path are necessarily swallowed — call `finish` to observe them).

use std::io::{self, Write};

use crate::io::prefs::WRITER_BUFSIZE;
use crate::stream::{Action, EncoderConfig, Status, Stream};

/// Map an engine error onto `io::Error` for the adapter surface.
pub(crate) fn engine_err_to_io(err: crate::stream::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("xzr error: {err}"))
}

/// Streaming compression writer.
pub struct XzrWriter<W: Write> {
    inner: Option<W>,
    stream: Stream,
    out_buf: Vec<u8>,
    finished: bool,
}

impl<W: Write> XzrWriter<W> {
    /// Create a writer producing one compressed stream into `inner`.
    pub fn new(inner: W, cfg: &EncoderConfig) -> io::Result<Self> {
        let mut stream = Stream::new();
        stream.init_encoder(cfg).map_err(engine_err_to_io)?;
        Ok(XzrWriter {
            inner: Some(inner),
            stream,
            out_buf: vec![0u8; WRITER_BUFSIZE],
            finished: false,
        })
    }

    /// Running `(bytes_in, bytes_out)` of the underlying stream.
    pub fn progress(&self) -> (u64, u64) {
        self.stream.progress()
    }

    fn sink(&mut self) -> io::Result<&mut W> {
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "writer already consumed"))
    }

    fn drive(&mut self, buf: &[u8], action: Action) -> io::Result<Status> {
        let r = self
            .stream
            .process(buf, &mut self.out_buf, action)
            .map_err(engine_err_to_io)?;
        if r.produced > 0 {
            let sink = self
                .inner
                .as_mut()
                .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "writer already consumed"))?;
            sink.write_all(&self.out_buf[..r.produced])?;
        }
        Ok(r.status)
    }

    fn finish_inner(&mut self) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        loop {
            if self.drive(&[], Action::Finish)? == Status::StreamEnded {
                self.finished = true;
                return self.sink()?.flush();
            }
        }
    }

    /// Flush all buffered data, write the end mark and trailer, and return
    /// the inner sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.finish_inner()?;
        self.inner
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "writer already consumed"))
    }
}

impl<W: Write> Write for XzrWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.finished {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "stream already finished",
            ));
        }
        // The engine may need several rounds to drain previously staged
        // output before it will accept input; never report 0 bytes written.
        loop {
            let before = self.stream.total_in();
            self.drive(buf, Action::Run)?;
            let consumed = (self.stream.total_in() - before) as usize;
            if consumed > 0 {
                return Ok(consumed);
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.finished {
            // Drain engine-pending output (the format has no sync flush; data
            // still in the accumulation window stays there until finish).
            while self.drive(&[], Action::Run)? == Status::OutputReady {}
        }
        self.sink()?.flush()
    }
}

impl<W: Write> Drop for XzrWriter<W> {
    fn drop(&mut self) {
        if !self.finished && self.inner.is_some() {
            let _ = self.finish_inner();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{decode_bytes, DecoderConfig};

    #[test]
    fn writer_round_trips_through_vec() {
        let data: Vec<u8> = b"writer adapter payload "
            .iter()
            .copied()
            .cycle()
            .take(10_000)
            .collect();
        let mut writer = XzrWriter::new(Vec::new(), &EncoderConfig::default()).expect("new");
        writer.write_all(&data).expect("write");
        let encoded = writer.finish().expect("finish");
        let decoded = decode_bytes(&encoded, &DecoderConfig::default()).expect("decode");
        assert_eq!(decoded, data);
    }

    #[test]
    fn drop_finishes_the_stream() {
        let data = b"finished by drop";
        let mut sink: Vec<u8> = Vec::new();
        {
            let mut writer =
                XzrWriter::new(&mut sink, &EncoderConfig::default()).expect("new");
            writer.write_all(data).expect("write");
        }
        let decoded = decode_bytes(&sink, &DecoderConfig::default()).expect("decode");
        assert_eq!(&decoded[..], data);
    }

    #[test]
    fn write_after_finish_reuses_nothing() {
        let mut writer = XzrWriter::new(Vec::new(), &EncoderConfig::default()).expect("new");
        writer.write_all(b"x").expect("write");
        writer.flush().expect("flush");
        let encoded = writer.finish().expect("finish");
        assert!(!encoded.is_empty());
    }
}
