//! rzip — a long-range compression engine.
//!
//! Two-stage design: a rolling-hash content-defined match finder removes
//! large-scale redundancy across an entire (memory-mapped) chunk, and the
//! residual literal/match opcode stream is handed to a conventional
//! block-sorting backend (bzip2) for the final entropy-coding pass.
//!
//! The library exposes the pieces the `rzip` binary is built from: the
//! rolling tag (`tag`), the culling hash table (`hash`), the match engine
//! (`matcher`), the opcode emitter and scan loop (`emitter`), the per-chunk
//! driver (`chunk`), the multiplexed container format (`container`), the
//! decompressor (`decompress`), and the outer file format and whole-file
//! driver (`header`, `driver`).

pub mod chunk;
pub mod cli;
pub mod container;
pub mod crc;
pub mod decompress;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod hash;
pub mod header;
pub mod levels;
pub mod limits;
pub mod matcher;
pub mod tag;

pub use error::{Result, RzipError};

/// Current on-disk format version, written into the file magic header.
pub const RZIP_MAJOR_VERSION: u8 = 2;
pub const RZIP_MINOR_VERSION: u8 = 1;
