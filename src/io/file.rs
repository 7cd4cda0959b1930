//! Whole-file compression and decompression helpers.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::io::prefs::{display_level, FILE_COPY_BUFSIZE};
use crate::io::reader::XzrReader;
use crate::io::writer::XzrWriter;
use crate::stream::EncoderConfig;

/// Compress `src_path` into `dst_path`.
///
/// Returns `(bytes_read, bytes_written)`.
pub fn compress_file<P: AsRef<Path>, Q: AsRef<Path>>(
    src_path: P,
    dst_path: Q,
    cfg: &EncoderConfig,
) -> io::Result<(u64, u64)> {
    let mut src = File::open(src_path)?;
    let dst = File::create(dst_path)?;
    let mut writer = XzrWriter::new(dst, cfg)?;

    let mut buf = vec![0u8; FILE_COPY_BUFSIZE];
    let mut read_total: u64 = 0;
    loop {
        let n = src.read(&mut buf)?;
        if n == 0 {
            break;
        }
        read_total += n as u64;
        writer.write_all(&buf[..n])?;
    }
    let dst = writer.finish()?;
    let written = dst.metadata().map(|m| m.len()).unwrap_or(0);

    let ratio = if read_total > 0 {
        written as f64 / read_total as f64 * 100.0
    } else {
        0.0
    };
    display_level(
        2,
        &format!(
            "Compressed {} bytes into {} bytes ==> {:.2}%\n",
            read_total, written, ratio
        ),
    );
    Ok((read_total, written))
}

/// Decompress `src_path` into `dst_path`.
///
/// Returns `(bytes_read, bytes_written)`.  Accepts concatenated streams.
pub fn decompress_file<P: AsRef<Path>, Q: AsRef<Path>>(
    src_path: P,
    dst_path: Q,
) -> io::Result<(u64, u64)> {
    let src = File::open(src_path)?;
    let mut dst = File::create(dst_path)?;
    let mut reader = XzrReader::new(src)?;

    let mut buf = vec![0u8; FILE_COPY_BUFSIZE];
    let mut written_total: u64 = 0;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        written_total += n as u64;
        dst.write_all(&buf[..n])?;
    }
    dst.flush()?;
    let (read_total, _) = reader.progress();

    display_level(
        2,
        &format!(
            "Successfully decoded {} bytes from {} compressed bytes\n",
            written_total, read_total
        ),
    );
    Ok((read_total, written_total))
}
