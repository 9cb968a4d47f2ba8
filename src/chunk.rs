//! Per-chunk driver (component C6): maps one chunk of the input file,
//! drives the opcode scan into a freshly opened container, and hands back a
//! file positioned at the end of that container.
//!
//! Grounded in `rzip_chunk` from the original `rzip.c`: `mmap(PROT_READ,
//! MAP_SHARED)` over exactly this chunk's byte range, one hash table reused
//! (and reset) across every chunk in the file, one container per chunk.

use crate::container::ContainerWriter;
use crate::emitter;
use crate::hash::HashTable;
use crate::levels::Level;
use crate::tag::TagTable;
use crate::Result;
use memmap2::MmapOptions;
use std::fs::File;

/// Compresses `chunk_len` bytes of `input` starting at `offset` into a new
/// container appended to `output`. `hash` is reset internally for this
/// chunk; the caller owns it across the whole file so its backing
/// allocation is made only once.
pub fn compress_chunk(
    input: &File,
    offset: u64,
    chunk_len: usize,
    output: File,
    tags: &TagTable,
    hash: &mut HashTable,
    level: &Level,
) -> Result<File> {
    let mut writer = ContainerWriter::create(output, level.bzip_level)?;

    if chunk_len == 0 {
        emitter::scan(&mut writer, &[], tags, hash, level)?;
    } else {
        let mmap = unsafe {
            MmapOptions::new()
                .offset(offset)
                .len(chunk_len)
                .map(input)?
        };
        emitter::scan(&mut writer, &mmap[..], tags, hash, level)?;
    }

    Ok(writer.close()?)
}
