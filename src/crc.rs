//! Running CRC-32 checksum (component C1).
//!
//! The original (`rzip.c`, via `crc32_buffer`) folds a CRC-32 over
//! progressively larger slices of the chunk as the scan advances, then folds
//! the tail at commit time. That incremental folding is expressed here with
//! the streaming `crc32fast::Hasher`, which accumulates state across calls
//! instead of restarting from a seed each time — the same incremental
//! behavior, backed by a real (SIMD-accelerated where available) crate
//! instead of a hand-rolled table, matching how this crate's pack sources
//! (e.g. the `blitzarch` archiver) reach for `crc32fast` for exactly this
//! concern.

use crc32fast::Hasher;

/// Accumulates a CRC-32 over a chunk's plaintext bytes as they are produced.
#[derive(Default)]
pub struct RunningCrc {
    hasher: Hasher,
}

impl RunningCrc {
    pub fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }

    /// Folds `bytes` into the running checksum.
    #[inline]
    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Returns the checksum accumulated so far without consuming it.
    pub fn current(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Consumes the accumulator and returns the final CRC-32.
    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }
}
