use super::{BLOCK_HEADER_LEN, HEADER_LEN, MAGIC, NONE_OFFSET};
use crate::error::{Result, RzipError};
use crate::limits::NUM_STREAMS;
use bzip2::read::BzDecoder;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

#[derive(Clone, Copy)]
struct BlockMeta {
    offset: u64,
    uncompressed_len: u32,
    compressed_len: u32,
}

/// Reads one container written by [`super::ContainerWriter`]. Walks each
/// stream's back-chain once at `open` time (last block to first, then
/// reversed) so that subsequent reads are sequential and on-demand
/// decompress one block at a time.
pub struct ContainerReader {
    file: File,
    order: [Vec<BlockMeta>; NUM_STREAMS],
    cursor: [usize; NUM_STREAMS],
    current_data: [Option<Vec<u8>>; NUM_STREAMS],
    current_pos: [usize; NUM_STREAMS],
}

impl ContainerReader {
    /// Parses the container header at `container_start` and chain-walks
    /// every stream's blocks. Returns the reader plus the absolute file
    /// offset one past this container's last block, so the caller can open
    /// the next container back-to-back.
    pub fn open(mut file: File, container_start: u64) -> Result<(Self, u64)> {
        file.seek(SeekFrom::Start(container_start))?;
        let mut hdr = [0u8; HEADER_LEN];
        file.read_exact(&mut hdr)?;
        if &hdr[0..4] != MAGIC {
            return Err(RzipError::BadMagic);
        }
        let stream_count = hdr[4] as usize;
        if stream_count != NUM_STREAMS {
            return Err(RzipError::BadStreamId(hdr[4]));
        }
        let mut last_offset = [0u64; NUM_STREAMS];
        for (s, slot) in last_offset.iter_mut().enumerate() {
            let start = 8 + s * 8;
            *slot = u64::from_le_bytes(hdr[start..start + 8].try_into().unwrap());
        }

        let mut order: [Vec<BlockMeta>; NUM_STREAMS] = std::array::from_fn(|_| Vec::new());
        let mut container_end = container_start + HEADER_LEN as u64;
        for s in 0..NUM_STREAMS {
            let mut chain = Vec::new();
            let mut off = last_offset[s];
            while off != NONE_OFFSET {
                file.seek(SeekFrom::Start(off))?;
                let mut bh = [0u8; BLOCK_HEADER_LEN];
                file.read_exact(&mut bh)?;
                let stream_id = bh[0];
                if stream_id as usize != s {
                    return Err(RzipError::BadStreamId(stream_id));
                }
                let ulen = u32::from_le_bytes(bh[1..5].try_into().unwrap());
                let clen = u32::from_le_bytes(bh[5..9].try_into().unwrap());
                let prev = u64::from_le_bytes(bh[9..17].try_into().unwrap());
                let block_end = off + BLOCK_HEADER_LEN as u64 + clen as u64;
                container_end = container_end.max(block_end);
                chain.push(BlockMeta { offset: off, uncompressed_len: ulen, compressed_len: clen });
                off = prev;
            }
            chain.reverse();
            order[s] = chain;
        }

        Ok((
            ContainerReader {
                file,
                order,
                cursor: [0; NUM_STREAMS],
                current_data: Default::default(),
                current_pos: [0; NUM_STREAMS],
            },
            container_end,
        ))
    }

    /// Ensures `current_data[stream]` has unread bytes, decompressing the
    /// next block in order if necessary. Returns `false` once the stream's
    /// chain is exhausted.
    fn ensure_block(&mut self, stream: usize) -> Result<bool> {
        loop {
            if let Some(data) = &self.current_data[stream] {
                if self.current_pos[stream] < data.len() {
                    return Ok(true);
                }
            }
            if self.cursor[stream] >= self.order[stream].len() {
                self.current_data[stream] = None;
                return Ok(false);
            }
            let meta = self.order[stream][self.cursor[stream]];
            self.cursor[stream] += 1;
            self.file.seek(SeekFrom::Start(meta.offset + BLOCK_HEADER_LEN as u64))?;
            let mut compressed = vec![0u8; meta.compressed_len as usize];
            self.file.read_exact(&mut compressed)?;
            let mut dec = BzDecoder::new(&compressed[..]);
            let mut out = Vec::with_capacity(meta.uncompressed_len as usize);
            dec.read_to_end(&mut out)?;
            self.current_data[stream] = Some(out);
            self.current_pos[stream] = 0;
        }
    }

    /// Fills `out` from logical `stream`, pulling in further blocks as
    /// needed. Errors with [`RzipError::Truncated`] if the stream's chain
    /// runs dry before `out` is full.
    pub fn read_stream(&mut self, stream: usize, out: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < out.len() {
            if !self.ensure_block(stream)? {
                return Err(RzipError::Truncated);
            }
            let data = self.current_data[stream].as_ref().expect("ensure_block just populated it");
            let pos = self.current_pos[stream];
            let take = (data.len() - pos).min(out.len() - filled);
            out[filled..filled + take].copy_from_slice(&data[pos..pos + take]);
            self.current_pos[stream] += take;
            filled += take;
        }
        Ok(())
    }
}
