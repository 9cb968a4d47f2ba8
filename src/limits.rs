//! Crate-wide constants, gathered in one place so every module that needs
//! one imports the same definition (mirrors `rzip.c`'s `#define
//! CHUNK_MULTIPLE`/`CKSUM_CHUNK`/`GREAT_MATCH`/`MINIMUM_MATCH` block and
//! `rzip.h`'s `NUM_STREAMS`).

/// Rolling-tag window length and minimum accepted match length. These
/// happen to be the same constant historically.
pub const MINIMUM_MATCH: usize = 31;

/// Match length past which a candidate is committed immediately, without
/// waiting to see if a longer overlapping match turns up.
pub const GREAT_MATCH: usize = 1024;

/// Base unit for chunk sizing: `chunk_size = max(1, level) * CHUNK_MULTIPLE`.
pub const CHUNK_MULTIPLE: u64 = 100 * 1024 * 1024;

/// Number of logical byte streams multiplexed through one container
/// (command opcodes + literal bytes). Fixed at 2; nothing in this crate
/// exercises a different stream count.
pub const NUM_STREAMS: usize = 2;

/// Logical stream carrying emitted opcodes (tag/length/offset) and the
/// trailing per-chunk CRC.
pub const STREAM_COMMANDS: usize = 0;

/// Logical stream carrying raw literal bytes.
pub const STREAM_LITERALS: usize = 1;
