//! Decompressor (component C8).
//!
//! Grounded in `unzip_literal`/`unzip_match`/`runzip_chunk`/`runzip_fd` from
//! the original `runzip.c`. A back-reference's distance is always relative
//! to the *current* output position and never crosses a chunk boundary (the
//! match engine never extends past `last_match`, the start of the chunk's
//! committed region), so decoding can treat the whole output file as one
//! contiguous stream and never needs to know where chunk boundaries fall.

use crate::container::ContainerReader;
use crate::crc::RunningCrc;
use crate::error::{Result, RzipError};
use crate::limits::{STREAM_COMMANDS, STREAM_LITERALS};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

const OP_LITERAL: u8 = 0x00;

/// Decodes one chunk's container starting at `input`'s current position.
///
/// `output` is the file being reconstructed (written sequentially); `history`
/// is a second, independent handle to that same file opened for reading, used
/// to satisfy back-references against bytes already flushed to `output`.
/// Returns the number of plaintext bytes produced, and leaves `input`
/// positioned just past this chunk's container.
pub fn decompress_chunk(input: &mut File, output: &mut File, history: &mut File) -> Result<u64> {
    let container_start = input.stream_position()?;
    let (mut reader, container_end) = ContainerReader::open(input.try_clone()?, container_start)?;

    let mut total = 0u64;
    let mut cksum = RunningCrc::new();

    loop {
        let mut head = [0u8; 1];
        reader.read_stream(STREAM_COMMANDS, &mut head)?;
        let mut len_buf = [0u8; 2];
        reader.read_stream(STREAM_COMMANDS, &mut len_buf)?;
        let len = u16::from_le_bytes(len_buf) as usize;

        if head[0] == OP_LITERAL && len == 0 {
            break;
        }

        if head[0] == OP_LITERAL {
            let mut buf = vec![0u8; len];
            reader.read_stream(STREAM_LITERALS, &mut buf)?;
            output.write_all(&buf)?;
            cksum.update(&buf);
            total += len as u64;
        } else {
            let mut dist_buf = [0u8; 4];
            reader.read_stream(STREAM_COMMANDS, &mut dist_buf)?;
            let dist = u32::from_le_bytes(dist_buf) as u64;
            let cur_pos = output.stream_position()?;
            if dist > cur_pos {
                return Err(RzipError::BackReferenceOutOfRange { offset: dist, position: cur_pos });
            }

            let mut remaining = len;
            let mut src_pos = cur_pos - dist;
            while remaining > 0 {
                let piece = remaining.min(dist as usize);
                let mut buf = vec![0u8; piece];
                history.seek(SeekFrom::Start(src_pos))?;
                history.read_exact(&mut buf)?;
                output.write_all(&buf)?;
                cksum.update(&buf);
                src_pos += piece as u64;
                remaining -= piece;
                total += piece as u64;
            }
        }
    }

    let mut crc_buf = [0u8; 4];
    reader.read_stream(STREAM_COMMANDS, &mut crc_buf)?;
    let expected = u32::from_le_bytes(crc_buf);
    let actual = cksum.finalize();
    if expected != actual {
        return Err(RzipError::ChecksumMismatch { expected, actual });
    }

    input.seek(SeekFrom::Start(container_end))?;
    Ok(total)
}

/// Decodes chunk after chunk from `input` (positioned just past the outer
/// file header) until `expected_size` plaintext bytes have been produced.
pub fn decompress_stream(mut input: File, mut output: File, mut history: File, expected_size: u64) -> Result<()> {
    let mut total = 0u64;
    while total < expected_size {
        let produced = decompress_chunk(&mut input, &mut output, &mut history)?;
        if produced == 0 {
            break;
        }
        total += produced;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::compress_chunk;
    use crate::hash::HashTable;
    use crate::levels::level;
    use crate::tag::TagTable;
    use std::io::Read;
    use tempfile::tempfile;

    fn round_trip(data: &[u8]) -> Vec<u8> {
        let mut input = tempfile().unwrap();
        input.write_all(data).unwrap();
        input.seek(SeekFrom::Start(0)).unwrap();

        let tags = TagTable::new(3);
        let mut hash = HashTable::new(1);
        let lvl = level(0);
        let compressed = tempfile().unwrap();
        let mut compressed = compress_chunk(&input, 0, data.len(), compressed, &tags, &mut hash, &lvl).unwrap();
        compressed.seek(SeekFrom::Start(0)).unwrap();

        let output = tempfile().unwrap();
        let history = output.try_clone().unwrap();
        decompress_stream(compressed, output.try_clone().unwrap(), history, data.len() as u64).unwrap();

        let mut out = output;
        out.seek(SeekFrom::Start(0)).unwrap();
        let mut got = Vec::new();
        out.read_to_end(&mut got).unwrap();
        got
    }

    #[test]
    fn round_trips_repetitive_data() {
        let mut data = vec![0u8; 2000];
        for (i, b) in data.iter_mut().enumerate() {
            *b = (i % 17) as u8;
        }
        data[1000..1400].copy_from_slice(&data[0..400]);
        assert_eq!(round_trip(&data), data);
    }

    #[test]
    fn round_trips_empty_input() {
        assert_eq!(round_trip(&[]), Vec::<u8>::new());
    }

    #[test]
    fn corrupted_crc_is_rejected() {
        use crate::container::{ContainerWriter, StreamSink};

        let container_file = tempfile().unwrap();
        let mut w = ContainerWriter::create(container_file, 1).unwrap();
        // literal "hi" ...
        w.write_stream(STREAM_COMMANDS, &[0x00, 0x02, 0x00]).unwrap();
        w.write_stream(STREAM_LITERALS, b"hi").unwrap();
        // ... terminator ...
        w.write_stream(STREAM_COMMANDS, &[0x00, 0x00, 0x00]).unwrap();
        // ... and a CRC that does not match "hi".
        w.write_stream(STREAM_COMMANDS, &0xDEAD_BEEFu32.to_le_bytes()).unwrap();
        let mut file = w.close().unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let mut output = tempfile().unwrap();
        let mut history = output.try_clone().unwrap();
        let err = decompress_chunk(&mut file, &mut output, &mut history).unwrap_err();
        assert!(matches!(err, RzipError::ChecksumMismatch { .. }));
    }
}
