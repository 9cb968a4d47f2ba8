//! Match engine (component C4): given a candidate tag, probes the hash
//! table and extends the best candidate forward and backward against the
//! mapped chunk buffer.
//!
//! Grounded in `find_best_match`/`match_len` from the original `rzip.c`.
//! All bookkeeping here uses `usize` byte offsets into the chunk slice
//! rather than raw pointers; the mapped buffer is a borrowed, read-only
//! `&[u8]`.

use crate::hash::HashTable;
use crate::limits::{GREAT_MATCH, MINIMUM_MATCH};

/// Extends a single candidate match anchored at `p0` (the scan cursor) vs.
/// `op0` (a previously recorded occurrence), forward to `end` and backward
/// to `last_match`.
///
/// Returns `Some((total_len, reverse))` when the extended match reaches at
/// least [`MINIMUM_MATCH`] bytes; `reverse` is how far the match extended
/// backward past `p0`. Mirrors `match_len`: the original rejects any
/// candidate with `op >= p0` (a forward or self reference), which here is
/// simply `op0 >= p0`.
pub fn match_len(buf: &[u8], p0: usize, op0: usize, end: usize, last_match: usize) -> Option<(usize, usize)> {
    if op0 >= p0 {
        return None;
    }

    let mut p = p0;
    let mut op = op0;
    while p < end && buf[p] == buf[op] {
        p += 1;
        op += 1;
    }
    let len_fwd = p - p0;

    let back_bound = last_match.max(0);
    let mut p = p0;
    let mut op = op0;
    while p > back_bound && op > 0 && buf[op - 1] == buf[p - 1] {
        op -= 1;
        p -= 1;
    }
    let rev = p0 - p;

    let total_len = len_fwd + rev;
    if total_len < MINIMUM_MATCH {
        None
    } else {
        Some((total_len, rev))
    }
}

/// Probes every hash-table occupant with tag `t`, keeping the longest
/// extended match (ties keep the later candidate in probe order; the choice
/// between tied candidates has no effect on correctness).
///
/// Returns `(length, offset, reverse)` where `offset` is the chunk-relative
/// source position the match starts from (after folding in the backward
/// extension), matching `H[h].offset - rev` in the original.
pub fn find_best_match(
    hash: &HashTable,
    t: u32,
    p: usize,
    buf: &[u8],
    end: usize,
    last_match: usize,
) -> Option<(usize, u32, usize)> {
    let mut best: Option<(usize, u32, usize)> = None;
    for op_offset in hash.probe(t) {
        let op = op_offset as usize;
        if let Some((len, rev)) = match_len(buf, p, op, end, last_match) {
            let better = match best {
                None => true,
                Some((best_len, _, _)) => len >= best_len,
            };
            if better {
                let offset = op_offset - rev as u32;
                best = Some((len, offset, rev));
            }
            // A sufficiently long match is taken immediately rather than
            // scanning the rest of the duplicate-tag chain for something
            // marginally longer.
            if len >= GREAT_MATCH {
                break;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_forward_or_self_reference() {
        let buf = vec![1u8; 64];
        assert_eq!(match_len(&buf, 10, 10, 64, 0), None);
        assert_eq!(match_len(&buf, 10, 20, 64, 0), None);
    }

    #[test]
    fn extends_forward_to_minimum_match() {
        let mut buf = vec![0u8; 100];
        for i in 0..40 {
            buf[i] = (i % 7) as u8;
            buf[50 + i] = (i % 7) as u8;
        }
        let got = match_len(&buf, 50, 0, 100, 0).expect("should match");
        assert!(got.0 >= MINIMUM_MATCH);
    }

    #[test]
    fn rejects_short_match() {
        let mut buf = vec![0u8; 100];
        buf[0] = 9;
        buf[50] = 9;
        assert_eq!(match_len(&buf, 50, 0, 100, 0), None);
    }

    #[test]
    fn extends_backward_but_not_past_last_match() {
        let mut buf = vec![5u8; 100];
        // Identical runs at [10..60) and [0..50) overlap entirely, so a
        // forward match from 10 vs 0 already exceeds MINIMUM_MATCH; the
        // backward extension should stop at last_match, not buffer start.
        let (len, rev) = match_len(&buf, 10, 0, 100, 5).unwrap();
        assert!(rev <= 10 - 5);
        assert!(len >= MINIMUM_MATCH);
        let _ = &mut buf;
    }

    #[test]
    fn find_best_match_prefers_longest_candidate() {
        let mut buf = vec![0u8; 200];
        for i in 0..35 {
            buf[i] = (i % 5) as u8;
        }
        // A short-lived duplicate at 100 (33 bytes) and a longer one at 150.
        buf[100..135].copy_from_slice(&buf[0..35]);
        buf[150..185].copy_from_slice(&buf[0..35]);
        buf[184] = buf[33]; // extend the second copy by one more matching byte
        let mut table = HashTable::new(1);
        table.reset(0);
        table.insert_and_maybe_clean(0xAAAA, 35, 4); // pretend tag recorded at offset 35 (end of first window)
        table.insert_and_maybe_clean(0xAAAA, 135, 4);
        table.insert_and_maybe_clean(0xAAAA, 185, 4);
        let found = find_best_match(&table, 0xAAAA, 185, &buf, 200, 0);
        assert!(found.is_some());
    }
}
