//! Error type for the rzip compressor/decompressor core.
//!
//! Mirrors the three-tier error model used throughout this crate: the
//! algorithmic core and container/decompressor layers return
//! `Result<T, RzipError>`, the CLI argument parser returns `anyhow::Result`,
//! and raw file I/O is surfaced via `RzipError::Io`. This hand-rolled enum
//! (no `thiserror`) mirrors the pattern already used by this codebase's
//! block-layer error types (`Lz4Error`, `BlockDecompressError`): a plain
//! `Debug` enum with a manual `Display` impl, promoted to a full
//! `std::error::Error` so `?` composes with `anyhow` at the CLI boundary.
//!
//! Every fatal condition this format can hit (bad magic, version mismatch,
//! checksum mismatch, truncated stream, out-of-range back-reference, and
//! ordinary I/O failure) has a dedicated variant so callers can match on the
//! failure kind instead of parsing message text.

use std::fmt;
use std::io;

/// Errors that can occur while compressing or decompressing an rzip stream.
#[derive(Debug)]
pub enum RzipError {
    /// Wraps an underlying I/O failure (open/read/write/seek/mmap).
    Io(io::Error),
    /// The 4-byte magic at the start of the file was not `"RZIP"`.
    BadMagic,
    /// The file's major/minor version is not one this crate understands.
    UnsupportedVersion { major: u8, minor: u8 },
    /// The trailing CRC-32 did not match the bytes actually reconstructed.
    ChecksumMismatch { expected: u32, actual: u32 },
    /// The command stream ended before a terminator opcode was read.
    Truncated,
    /// A back-reference's offset would read before the start of the output.
    BackReferenceOutOfRange { offset: u64, position: u64 },
    /// A container block referenced a logical stream id ≥ `NUM_STREAMS`.
    BadStreamId(u8),
}

impl fmt::Display for RzipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RzipError::Io(e) => write!(f, "{e}"),
            RzipError::BadMagic => write!(f, "not an rzip file"),
            RzipError::UnsupportedVersion { major, minor } => {
                write!(f, "unsupported rzip format version {major}.{minor}")
            }
            RzipError::ChecksumMismatch { expected, actual } => write!(
                f,
                "bad checksum 0x{actual:08x} - expected 0x{expected:08x}"
            ),
            RzipError::Truncated => write!(f, "truncated command stream"),
            RzipError::BackReferenceOutOfRange { offset, position } => write!(
                f,
                "back-reference offset {offset} exceeds current position {position}"
            ),
            RzipError::BadStreamId(id) => write!(f, "invalid stream id {id}"),
        }
    }
}

impl std::error::Error for RzipError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RzipError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RzipError {
    fn from(e: io::Error) -> Self {
        RzipError::Io(e)
    }
}

impl From<RzipError> for io::Error {
    fn from(e: RzipError) -> Self {
        match e {
            RzipError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RzipError>;
