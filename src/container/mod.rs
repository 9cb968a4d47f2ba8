//! Multi-stream container (component C7): muxes the two logical byte
//! streams (opcode commands and literal bytes) produced by one chunk scan
//! through a single bzip2-backed file, with per-stream back-chaining so the
//! reader can reconstruct each stream's block order.
//!
//! A fixed-size header (rewritten once the trailing block offsets are known
//! — this crate always runs through a seekable file, see DESIGN.md) is
//! followed by a sequence of compressed blocks, each tagged with its logical
//! stream id and a backward pointer to the previous block of that same
//! stream.

pub mod reader;
pub mod writer;

pub use reader::ContainerReader;
pub use writer::ContainerWriter;

use crate::limits::NUM_STREAMS;
use std::io;

/// 4-byte container magic, distinct from the outer file magic (`"RZIP"`).
pub(crate) const MAGIC: &[u8; 4] = b"RZC1";

/// Sentinel "no block yet" value for a stream's last-block-offset slot and
/// for a block's `prev_offset` field.
pub(crate) const NONE_OFFSET: u64 = u64::MAX;

/// Fixed container header size: 4 (magic) + 1 (stream count) + 3 (reserved)
/// + 8 bytes per stream's last-block offset.
pub(crate) const HEADER_LEN: usize = 4 + 1 + 3 + 8 * NUM_STREAMS;

/// Fixed per-block header size: stream id (1) + uncompressed len (4) +
/// compressed len (4) + previous-block-of-this-stream offset (8).
pub(crate) const BLOCK_HEADER_LEN: usize = 1 + 4 + 4 + 8;

/// bzip2's own block size cap (900 KiB at level 9); used here as the
/// in-memory buffering threshold before a stream's accumulated bytes are
/// flushed to a compressed block.
pub(crate) const BLOCK_BUFFER_SIZE: usize = 900 * 1024;

/// Sink side of the container abstraction: write raw bytes into one of the
/// `NUM_STREAMS` logical streams. Implemented by [`ContainerWriter`]; the
/// opcode emitter (`crate::emitter`) is generic over this trait so it never
/// needs to know about block framing or the backend compressor.
pub trait StreamSink {
    fn write_stream(&mut self, stream: usize, bytes: &[u8]) -> io::Result<()>;
}
