//! Compression level presets.
//!
//! Ten presets, indexed `0..=9`, each driving the backend block
//! compressor's strength, the hash table's memory budget, the initial
//! insertion-gate bit count, and the duplicate-tag chain cap. Taken verbatim
//! from the `levels[10]` table in the original `rzip.c`.

use crate::limits::CHUNK_MULTIPLE;

/// One compression level's tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    /// Strength passed to the backend block compressor (C7).
    pub bzip_level: u32,
    /// Target hash-table memory budget in mebibytes; `B` is chosen so that
    /// `2^B * size_of::<HashEntry>() ≈ mb_used * 1 MiB`.
    pub mb_used: u32,
    /// Initial `tag_mask` bit count: the insertion gate starts at
    /// `(1 << initial_freq) - 1`.
    pub initial_freq: u32,
    /// Maximum duplicate-tag chain length before a round-robin victim is
    /// evicted.
    pub max_chain_len: u32,
}

/// The ten preset levels, in `{bzip_level, mb_used, initial_freq,
/// max_chain_len}` order, indexed by level number `0..=9`.
pub const LEVELS: [Level; 10] = [
    Level { bzip_level: 0, mb_used: 1, initial_freq: 4, max_chain_len: 1 },
    Level { bzip_level: 1, mb_used: 2, initial_freq: 4, max_chain_len: 2 },
    Level { bzip_level: 3, mb_used: 4, initial_freq: 4, max_chain_len: 2 },
    Level { bzip_level: 5, mb_used: 8, initial_freq: 4, max_chain_len: 2 },
    Level { bzip_level: 7, mb_used: 16, initial_freq: 4, max_chain_len: 3 },
    Level { bzip_level: 9, mb_used: 32, initial_freq: 4, max_chain_len: 4 },
    Level { bzip_level: 9, mb_used: 32, initial_freq: 2, max_chain_len: 6 },
    Level { bzip_level: 9, mb_used: 64, initial_freq: 1, max_chain_len: 16 },
    Level { bzip_level: 9, mb_used: 64, initial_freq: 1, max_chain_len: 32 },
    Level { bzip_level: 9, mb_used: 64, initial_freq: 1, max_chain_len: 128 },
];

/// Looks up the preset for `level`, clamping to the highest defined level
/// the way the original clamps to `MIN(9, compression_level)`.
pub fn level(level: u8) -> Level {
    LEVELS[(level as usize).min(9)]
}

/// Chunk size in bytes for `level`: `max(1, level) * CHUNK_MULTIPLE`.
pub fn chunk_size(level: u8) -> u64 {
    (level.max(1) as u64) * CHUNK_MULTIPLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_preset() {
        assert_eq!(
            level(0),
            Level { bzip_level: 0, mb_used: 1, initial_freq: 4, max_chain_len: 1 }
        );
    }

    #[test]
    fn level_nine_preset() {
        assert_eq!(
            level(9),
            Level { bzip_level: 9, mb_used: 64, initial_freq: 1, max_chain_len: 128 }
        );
    }

    #[test]
    fn level_above_nine_clamps() {
        assert_eq!(level(9), level(200));
    }

    #[test]
    fn chunk_size_scales_with_level_and_floors_at_one() {
        assert_eq!(chunk_size(0), CHUNK_MULTIPLE);
        assert_eq!(chunk_size(1), CHUNK_MULTIPLE);
        assert_eq!(chunk_size(4), 4 * CHUNK_MULTIPLE);
    }
}
