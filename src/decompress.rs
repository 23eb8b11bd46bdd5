//! Bounded decompression of uploaded dump payloads
//!
//! Uploaded bytes are untrusted. Every path enforces two independent
//! ceilings: `Limits::max_raw_bytes` on the bytes as received and
//! `Limits::max_payload_bytes` on the bytes handed to the text decoder.
//!
//! # Invariants
//! - A successful result is never longer than `max_payload_bytes`.
//! - gzip and zip output is pulled through [`BoundedReader`], so at most
//!   `max_payload_bytes + 1` decompressed bytes are ever materialized.
//! - zip archives must hold exactly one file entry; directory entries are
//!   ignored when counting.

use crate::error::{Ceiling, DumpError, Result};
use crate::types::{DumpKind, Limits};
use flate2::read::MultiGzDecoder;
use std::fmt;
use std::io::{self, Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

/// Upper bound for the initial output allocation, independent of the ceiling
const INITIAL_CAPACITY_MAX: u64 = 1024 * 1024;

/// Marker carried inside the `io::Error` returned once the ceiling is crossed
#[derive(Debug)]
struct CeilingExceeded {
    limit: u64,
}

impl fmt::Display for CeilingExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "read ceiling of {} bytes exceeded", self.limit)
    }
}

impl std::error::Error for CeilingExceeded {}

/// Read wrapper that fails once more than `limit` bytes have been pulled.
///
/// Each call forwards at most `limit - pulled + 1` bytes to the inner reader,
/// so crossing the ceiling is detected after a single extra byte.
pub struct BoundedReader<R> {
    inner: R,
    limit: u64,
    pulled: u64,
}

impl<R> BoundedReader<R> {
    pub fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            limit,
            pulled: 0,
        }
    }

    /// Bytes pulled from the inner reader so far
    pub fn pulled(&self) -> u64 {
        self.pulled
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    fn exceeded(&self) -> io::Error {
        io::Error::new(
            io::ErrorKind::Other,
            CeilingExceeded { limit: self.limit },
        )
    }
}

impl<R: Read> BoundedReader<R> {
    /// Drain the inner reader into memory.
    ///
    /// Crossing the ceiling maps to `PayloadTooLarge`; any other read failure
    /// means the container is corrupt and maps to `InvalidFormat`.
    pub fn read_all(mut self) -> Result<Vec<u8>> {
        let capacity = self.limit.min(INITIAL_CAPACITY_MAX) as usize;
        let mut payload = Vec::with_capacity(capacity);
        match self.read_to_end(&mut payload) {
            Ok(_) => Ok(payload),
            Err(err) if is_ceiling_error(&err) => Err(DumpError::PayloadTooLarge {
                ceiling: Ceiling::Decompressed,
                limit: self.limit,
            }),
            Err(err) => Err(DumpError::InvalidFormat(err.to_string())),
        }
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pulled > self.limit {
            return Err(self.exceeded());
        }
        let allowance = (self.limit - self.pulled).saturating_add(1);
        let window = buf.len().min(usize::try_from(allowance).unwrap_or(usize::MAX));
        let n = self.inner.read(&mut buf[..window])?;
        self.pulled = self.pulled.saturating_add(n as u64);
        if self.pulled > self.limit {
            return Err(self.exceeded());
        }
        Ok(n)
    }
}

fn is_ceiling_error(err: &io::Error) -> bool {
    err.get_ref()
        .is_some_and(|inner| inner.is::<CeilingExceeded>())
}

/// Turn raw uploaded bytes into the payload bytes of the dump
pub fn decompress_payload(raw: &[u8], kind: DumpKind, limits: &Limits) -> Result<Vec<u8>> {
    let raw_len = raw.len() as u64;
    if raw_len > limits.max_raw_bytes {
        return Err(DumpError::PayloadTooLarge {
            ceiling: Ceiling::Raw,
            limit: limits.max_raw_bytes,
        });
    }

    debug!(?kind, raw_bytes = raw_len, "decompressing dump payload");

    let payload = match kind {
        DumpKind::Plain => {
            if raw_len > limits.max_payload_bytes {
                return Err(DumpError::PayloadTooLarge {
                    ceiling: Ceiling::Decompressed,
                    limit: limits.max_payload_bytes,
                });
            }
            raw.to_vec()
        }
        DumpKind::Gzip => decompress_gzip(raw, limits.max_payload_bytes)?,
        DumpKind::Zip => extract_single_zip_entry(raw, limits.max_payload_bytes)?,
    };

    debug!(payload_bytes = payload.len(), "payload ready");
    Ok(payload)
}

fn decompress_gzip(raw: &[u8], limit: u64) -> Result<Vec<u8>> {
    BoundedReader::new(MultiGzDecoder::new(raw), limit).read_all()
}

fn extract_single_zip_entry(raw: &[u8], limit: u64) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(raw))?;

    // Central directory only; nothing is decompressed while counting
    let mut file_entries = Vec::new();
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        if !entry.is_dir() {
            file_entries.push(index);
        }
    }

    let index = match file_entries.as_slice() {
        [] => return Err(DumpError::EmptyArchive),
        [index] => *index,
        entries => return Err(DumpError::MultipleEntriesNotAllowed(entries.len())),
    };

    let entry = archive.by_index(index)?;
    let declared = entry.size();
    debug!(name = entry.name(), declared_bytes = declared, "reading zip entry");
    if declared > limit {
        return Err(DumpError::PayloadTooLarge {
            ceiling: Ceiling::Decompressed,
            limit,
        });
    }

    // The declared size is attacker-controlled; re-check what is actually read
    BoundedReader::new(entry, limit).read_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn limits(max_raw_bytes: u64, max_payload_bytes: u64) -> Limits {
        Limits {
            max_raw_bytes,
            max_payload_bytes,
        }
    }

    #[test]
    fn test_bounded_reader_allows_exact_limit() {
        let data = vec![b'x'; 64];
        let payload = BoundedReader::new(data.as_slice(), 64).read_all().unwrap();
        assert_eq!(payload.len(), 64);
    }

    #[test]
    fn test_bounded_reader_fails_one_past_limit() {
        let data = vec![b'x'; 65];
        let mut reader = BoundedReader::new(data.as_slice(), 64);
        let mut sink = Vec::new();
        let err = reader.read_to_end(&mut sink).unwrap_err();
        assert!(is_ceiling_error(&err));
        assert_eq!(reader.pulled(), 65);
    }

    #[test]
    fn test_bounded_reader_maps_ceiling_to_payload_too_large() {
        let data = vec![0u8; 10];
        let err = BoundedReader::new(data.as_slice(), 9).read_all().unwrap_err();
        assert!(matches!(
            err,
            DumpError::PayloadTooLarge {
                ceiling: Ceiling::Decompressed,
                limit: 9
            }
        ));
    }

    #[test]
    fn test_plain_passthrough() {
        let raw = b"set p_roll = 45\n";
        let payload = decompress_payload(raw, DumpKind::Plain, &Limits::default()).unwrap();
        assert_eq!(payload, raw);
    }

    #[test]
    fn test_plain_over_payload_ceiling() {
        let raw = vec![b'a'; 100];
        let err = decompress_payload(&raw, DumpKind::Plain, &limits(1000, 99)).unwrap_err();
        assert!(matches!(
            err,
            DumpError::PayloadTooLarge {
                ceiling: Ceiling::Decompressed,
                ..
            }
        ));
    }

    #[test]
    fn test_raw_ceiling_checked_first() {
        let raw = vec![b'a'; 100];
        let err = decompress_payload(&raw, DumpKind::Zip, &limits(50, 1000)).unwrap_err();
        assert!(matches!(
            err,
            DumpError::PayloadTooLarge {
                ceiling: Ceiling::Raw,
                limit: 50
            }
        ));
    }

    #[test]
    fn test_gzip_roundtrip_within_ceiling() {
        let text = b"# version\n# Betaflight / STM32F405 (S405) 4.3.1\n";
        let payload = decompress_payload(&gzip(text), DumpKind::Gzip, &Limits::default()).unwrap();
        assert_eq!(payload, text);
    }

    #[test]
    fn test_gzip_expansion_over_ceiling() {
        // 1 MiB of zeros compresses to about a kilobyte
        let bomb = gzip(&vec![0u8; 1024 * 1024]);
        assert!(bomb.len() < 16 * 1024);
        let err = decompress_payload(&bomb, DumpKind::Gzip, &limits(16 * 1024, 4096)).unwrap_err();
        assert!(matches!(err, DumpError::PayloadTooLarge { limit: 4096, .. }));
    }

    #[test]
    fn test_gzip_corrupt_stream() {
        let mut data = gzip(b"set gyro_lowpass_hz = 150\n");
        // Trailer is CRC32 then ISIZE; break the checksum
        let crc_offset = data.len() - 8;
        data[crc_offset] ^= 0xff;
        let err = decompress_payload(&data, DumpKind::Gzip, &Limits::default()).unwrap_err();
        assert!(matches!(err, DumpError::InvalidFormat(_)));
    }

    #[test]
    fn test_gzip_not_gzip_at_all() {
        let err = decompress_payload(b"plain text", DumpKind::Gzip, &Limits::default()).unwrap_err();
        assert!(matches!(err, DumpError::InvalidFormat(_)));
    }

    #[test]
    fn test_zip_garbage_is_invalid_format() {
        let err = decompress_payload(b"PK\x03\x04garbage", DumpKind::Zip, &Limits::default())
            .unwrap_err();
        assert!(matches!(err, DumpError::InvalidFormat(_)));
    }
}
