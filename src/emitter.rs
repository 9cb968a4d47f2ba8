//! Opcode encoding and the per-chunk scan loop (component C5).
//!
//! Grounded in `hash_search`/`put_match`/`put_literal`/`put_header` from the
//! original `rzip.c`. Two opcodes exist, each written to the command stream
//! (`STREAM_COMMANDS`) as a one-byte head, a little-endian `u16` length, and
//! (for a match) a little-endian `u32` back-distance:
//!
//! - literal: head `0x00`, length `L`, followed by `L` raw bytes on
//!   `STREAM_LITERALS`. `L == 0` is reserved for the terminator.
//! - match: head `0x01`, length `L`, distance `D` (bytes back from the
//!   current output position to the start of the source run).
//!
//! A run longer than `u16::MAX` is split into consecutive opcodes of the
//! same kind (`put_header`'s "piece at a time" loop in the original).
//! Every chunk ends with one terminator opcode (`0x00 0x00 0x00`) followed
//! by a little-endian `u32` CRC-32 of the chunk's plaintext.

use crate::container::StreamSink;
use crate::crc::RunningCrc;
use crate::hash::HashTable;
use crate::levels::Level;
use crate::limits::{GREAT_MATCH, MINIMUM_MATCH, STREAM_COMMANDS, STREAM_LITERALS};
use crate::matcher::find_best_match;
use crate::tag::TagTable;
use crate::Result;

const OP_LITERAL: u8 = 0x00;
const OP_MATCH: u8 = 0x01;

fn put_u8<W: StreamSink>(w: &mut W, stream: usize, b: u8) -> std::io::Result<()> {
    w.write_stream(stream, &[b])
}

fn put_u16<W: StreamSink>(w: &mut W, stream: usize, v: u16) -> std::io::Result<()> {
    w.write_stream(stream, &v.to_le_bytes())
}

fn put_u32<W: StreamSink>(w: &mut W, stream: usize, v: u32) -> std::io::Result<()> {
    w.write_stream(stream, &v.to_le_bytes())
}

/// Emits one terminator opcode: head `0x00`, length `0x0000`.
fn put_terminator<W: StreamSink>(w: &mut W) -> std::io::Result<()> {
    put_u8(w, STREAM_COMMANDS, OP_LITERAL)?;
    put_u16(w, STREAM_COMMANDS, 0)
}

/// Emits a literal run of `buf[start..start+len]`, split into pieces of at
/// most `u16::MAX` bytes each. Never called with `len == 0` — that value is
/// reserved for [`put_terminator`].
fn put_literal<W: StreamSink>(w: &mut W, buf: &[u8], start: usize, len: usize) -> std::io::Result<()> {
    debug_assert!(len > 0);
    let mut off = start;
    let mut remaining = len;
    while remaining > 0 {
        let piece = remaining.min(u16::MAX as usize);
        put_u8(w, STREAM_COMMANDS, OP_LITERAL)?;
        put_u16(w, STREAM_COMMANDS, piece as u16)?;
        w.write_stream(STREAM_LITERALS, &buf[off..off + piece])?;
        off += piece;
        remaining -= piece;
    }
    Ok(())
}

/// Emits a back-reference of `len` bytes at distance `dist` from the current
/// output position, split into pieces the same way as [`put_literal`].
fn put_match<W: StreamSink>(w: &mut W, len: usize, dist: u32) -> std::io::Result<()> {
    let mut remaining = len;
    while remaining > 0 {
        let piece = remaining.min(u16::MAX as usize);
        put_u8(w, STREAM_COMMANDS, OP_MATCH)?;
        put_u16(w, STREAM_COMMANDS, piece as u16)?;
        put_u32(w, STREAM_COMMANDS, dist)?;
        remaining -= piece;
    }
    Ok(())
}

/// Scans one mapped chunk, emitting opcodes to `writer` and returning once
/// the trailing CRC-32 has been written.
///
/// `buf` is the entire chunk (small chunks, including the empty chunk, are
/// handled as a single literal run since no window fits); `hash` is reset
/// for this chunk's lifetime via [`HashTable::reset`].
pub fn scan<W: StreamSink>(writer: &mut W, buf: &[u8], tags: &TagTable, hash: &mut HashTable, level: &Level) -> Result<()> {
    let chunk_size = buf.len();
    let window = crate::tag::WINDOW;
    let mut cksum = RunningCrc::new();
    cksum.update(buf);

    if chunk_size < window {
        if chunk_size > 0 {
            put_literal(writer, buf, 0, chunk_size)?;
        }
        put_terminator(writer)?;
        put_u32(writer, STREAM_COMMANDS, cksum.finalize())?;
        return Ok(());
    }

    let mut tag_mask = hash.reset(level.initial_freq);
    let last_window_start = chunk_size - window;
    let mut p = 0usize;
    let mut t = tags.full_tag(&buf[0..window]);
    let mut last_match = 0usize;

    // Best match anchored at any recently considered position. Rather than
    // committing the first qualifying candidate, the scan keeps sliding past
    // it since a later position may extend further back and overtake it,
    // and only commits once `current` is GREAT_MATCH-sized or the cursor
    // has moved far enough past its anchor that further lookahead cannot
    // improve it (`p >= current_p + MINIMUM_MATCH`).
    let mut current_p = p;
    let mut current_len = 0usize;
    let mut current_offset = 0u32;

    while p < last_window_start {
        t = tags.next_tag(buf[p], buf[p + window], t);
        p += 1;

        // A position whose tag doesn't meet the current floor is skipped
        // entirely: no match attempt, no insertion, and no commit check
        // (mirrors `hash_search`'s `continue` on a failed gate, which jumps
        // straight back to sliding the tag without reaching the commit
        // test below).
        if !hash.should_match(t) {
            continue;
        }

        if let Some((len, offset, rev)) = find_best_match(hash, t, p, buf, last_window_start, last_match) {
            if len > current_len {
                current_p = p - rev;
                current_len = len;
                current_offset = offset;
            }
        }

        if (t & tag_mask) == tag_mask {
            if let Some(new_mask) = hash.insert_and_maybe_clean(t, p as u32, level.max_chain_len) {
                tag_mask = new_mask;
            }
        }

        if current_len >= MINIMUM_MATCH && (current_len >= GREAT_MATCH || p >= current_p + MINIMUM_MATCH) {
            if last_match < current_p {
                put_literal(writer, buf, last_match, current_p - last_match)?;
            }
            let dist = (current_p - current_offset as usize) as u32;
            put_match(writer, current_len, dist)?;
            last_match = current_p + current_len;
            current_len = 0;

            if last_match > last_window_start {
                break;
            }
            p = last_match;
            current_p = p;
            t = tags.full_tag(&buf[p..p + window]);
        }
    }

    if last_match < chunk_size {
        put_literal(writer, buf, last_match, chunk_size - last_match)?;
    }
    put_terminator(writer)?;
    put_u32(writer, STREAM_COMMANDS, cksum.finalize())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerWriter;
    use crate::levels::level;
    use tempfile::tempfile;

    fn drive(buf: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let tags = TagTable::new(1);
        let mut hash = HashTable::new(1);
        let lvl = level(0);
        let file = tempfile().unwrap();
        let mut w = ContainerWriter::create(file, lvl.bzip_level.max(1)).unwrap();
        scan(&mut w, buf, &tags, &mut hash, &lvl).unwrap();
        let file = w.close().unwrap();
        let (mut r, _end) = crate::container::ContainerReader::open(file, 0).unwrap();
        let mut commands = Vec::new();
        loop {
            let mut b = [0u8; 1];
            if r.read_stream(STREAM_COMMANDS, &mut b).is_err() {
                break;
            }
            commands.push(b[0]);
            if commands.len() > 10_000_000 {
                panic!("runaway command stream");
            }
        }
        let mut literals = Vec::new();
        loop {
            let mut b = [0u8; 1];
            match r.read_stream(STREAM_LITERALS, &mut b) {
                Ok(()) => literals.push(b[0]),
                Err(_) => break,
            }
        }
        (commands, literals)
    }

    #[test]
    fn empty_chunk_emits_only_terminator_and_zero_crc() {
        let tags = TagTable::new(1);
        let mut hash = HashTable::new(1);
        let lvl = level(0);
        let file = tempfile().unwrap();
        let mut w = ContainerWriter::create(file, 1).unwrap();
        scan(&mut w, &[], &tags, &mut hash, &lvl).unwrap();
        let file = w.close().unwrap();
        let (mut r, _end) = crate::container::ContainerReader::open(file, 0).unwrap();
        let mut head = [0u8; 3];
        r.read_stream(STREAM_COMMANDS, &mut head).unwrap();
        assert_eq!(head, [0, 0, 0]);
        let mut crc = [0u8; 4];
        r.read_stream(STREAM_COMMANDS, &mut crc).unwrap();
        assert_eq!(u32::from_le_bytes(crc), 0);
    }

    #[test]
    fn short_buffer_below_window_is_pure_literal() {
        let buf = b"short".to_vec();
        let (commands, literals) = drive(&buf);
        assert_eq!(commands[0], OP_LITERAL);
        assert_eq!(&literals, &buf);
    }

    #[test]
    fn repeated_pattern_produces_a_match_opcode() {
        let mut buf = vec![0u8; 400];
        for (i, b) in buf.iter_mut().enumerate().take(100) {
            *b = (i % 13) as u8;
        }
        for i in 0..100 {
            buf[250 + i] = buf[i];
        }
        let (commands, _literals) = drive(&buf);
        assert!(commands.iter().any(|&b| b == OP_MATCH));
    }
}
