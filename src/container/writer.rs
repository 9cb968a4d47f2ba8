use super::{StreamSink, BLOCK_BUFFER_SIZE, BLOCK_HEADER_LEN, HEADER_LEN, MAGIC, NONE_OFFSET};
use crate::limits::NUM_STREAMS;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};

/// Writes one container: buffers each logical stream, flushing fixed-size
/// blocks through a bzip2 encoder as they fill, and rewrites the header with
/// the final back-chain offsets on [`ContainerWriter::close`].
pub struct ContainerWriter {
    file: File,
    header_start: u64,
    bzip_level: u32,
    buffers: [Vec<u8>; NUM_STREAMS],
    last_block_offset: [u64; NUM_STREAMS],
}

impl ContainerWriter {
    /// Reserves a zeroed header at the file's current position and returns a
    /// writer ready to accept stream bytes. `bzip_level` is the backend
    /// compressor's block-size selector (1-9; clamped).
    pub fn create(mut file: File, bzip_level: u32) -> io::Result<Self> {
        let header_start = file.stream_position()?;
        file.write_all(&[0u8; HEADER_LEN])?;
        Ok(ContainerWriter {
            file,
            header_start,
            bzip_level,
            buffers: std::array::from_fn(|_| Vec::new()),
            last_block_offset: [NONE_OFFSET; NUM_STREAMS],
        })
    }

    fn flush_block(&mut self, stream: usize, data: Vec<u8>) -> io::Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let level = Compression::new(self.bzip_level.clamp(1, 9));
        let mut enc = BzEncoder::new(Vec::new(), level);
        enc.write_all(&data)?;
        let compressed = enc.finish()?;

        let block_offset = self.file.stream_position()?;
        self.file.write_all(&[stream as u8])?;
        self.file.write_all(&(data.len() as u32).to_le_bytes())?;
        self.file.write_all(&(compressed.len() as u32).to_le_bytes())?;
        self.file.write_all(&self.last_block_offset[stream].to_le_bytes())?;
        self.file.write_all(&compressed)?;
        self.last_block_offset[stream] = block_offset;
        Ok(())
    }

    /// Flushes every stream's remaining buffer and rewrites the reserved
    /// header with the final back-chain offsets, leaving the file positioned
    /// at the end of this container so the caller can start the next one.
    pub fn close(mut self) -> io::Result<File> {
        for s in 0..NUM_STREAMS {
            let data = std::mem::take(&mut self.buffers[s]);
            self.flush_block(s, data)?;
        }
        let end = self.file.stream_position()?;
        self.file.seek(SeekFrom::Start(self.header_start))?;
        self.file.write_all(MAGIC)?;
        self.file.write_all(&[NUM_STREAMS as u8, 0, 0, 0])?;
        for s in 0..NUM_STREAMS {
            self.file.write_all(&self.last_block_offset[s].to_le_bytes())?;
        }
        self.file.seek(SeekFrom::Start(end))?;
        Ok(self.file)
    }
}

impl StreamSink for ContainerWriter {
    fn write_stream(&mut self, stream: usize, bytes: &[u8]) -> io::Result<()> {
        self.buffers[stream].extend_from_slice(bytes);
        while self.buffers[stream].len() >= BLOCK_BUFFER_SIZE {
            let remainder = self.buffers[stream].split_off(BLOCK_BUFFER_SIZE);
            let chunk = std::mem::replace(&mut self.buffers[stream], remainder);
            self.flush_block(stream, chunk)?;
        }
        Ok(())
    }
}

const _: () = assert!(BLOCK_HEADER_LEN == 17);
