//! Module with all the things related to LAZ chunk tables
use crate::compressors::IntegerCompressorBuilder;
use crate::decoders::ArithmeticDecoder;
use crate::decompressors::IntegerDecompressorBuilder;
use crate::encoders::ArithmeticEncoder;
use crate::{LasZipError, LazVlr};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};
use std::ops::Index;
use std::slice::SliceIndex;

/// An entry describe one chunk and contains 2 information:
///
/// - The number of bytes in the compressed chunk
/// - The number of points in the compressed
#[derive(Copy, Clone, Debug)]
pub(super) struct ChunkTableEntry {
    pub(super) point_count: u64,
    pub(super) byte_count: u64,
}

/// The ChunkTable contains chunk entries for a LAZ file.
///
/// The ChunkTable has two ways of being stored in a LAZ file
/// depending on if the chunks are fixed-size variable-sized
///
/// fixed-size chunks -> Only the number of bytes of the chunk is stored
/// variable-size chunks -> Both the number of points and the number of bytes are stored
pub(super) struct ChunkTable(pub(super) Vec<ChunkTableEntry>);

impl ChunkTable {
    /// Actual implementation of the reading of the chunk table.
    fn read<R: Read + Seek>(mut src: &mut R, contains_point_count: bool) -> std::io::Result<Self> {
        let _version = src.read_u32::<LittleEndian>()?;
        let number_of_chunks = src.read_u32::<LittleEndian>()?;

        let mut decompressor = IntegerDecompressorBuilder::new()
            .bits(32)
            .contexts(2)
            .build_initialized();
        let mut decoder = ArithmeticDecoder::new(&mut src);
        decoder.read_init_bytes()?;

        let mut chunk_table = ChunkTable::with_capacity(number_of_chunks as usize);
        let mut last_entry = ChunkTableEntry {
            point_count: 0,
            byte_count: 0,
        };
        for _ in 1..=number_of_chunks {
            let mut current_entry = ChunkTableEntry {
                point_count: 0,
                byte_count: 0,
            };
            if contains_point_count {
                current_entry.point_count = u64::from_le(decompressor.decompress(
                    &mut decoder,
                    last_entry.point_count as i32,
                    0,
                )? as u64);
            }
            current_entry.byte_count = u64::from_le(decompressor.decompress(
                &mut decoder,
                last_entry.byte_count as i32,
                1,
            )? as u64);

            chunk_table.0.push(current_entry);
            last_entry = current_entry;
        }
        Ok(chunk_table)
    }
}

/// Resolves the offset to the chunk table (re-reading it from the end of the
/// stream when the compressor could not seek back to patch it in) and reads
/// the table located there.
///
/// `src` is left at the position it had when this function was called.
pub(super) fn read_chunk_table_at_offset<R: Read + Seek>(
    mut src: R,
    vlr: &LazVlr,
    mut offset_to_chunk_table: i64,
) -> crate::Result<ChunkTable> {
    let current_pos = src.seek(SeekFrom::Current(0))?;
    if offset_to_chunk_table == -1 {
        // The compressor was writing to a non-seekable destination and could
        // not patch the offset in, it is stored in the last 8 bytes instead.
        src.seek(SeekFrom::End(-8))?;
        offset_to_chunk_table = src.read_i64::<LittleEndian>()?;
    }
    if offset_to_chunk_table < 0 {
        return Err(LasZipError::MissingChunkTable);
    }
    src.seek(SeekFrom::Start(offset_to_chunk_table as u64))?;
    let table = ChunkTable::read(&mut src, vlr.uses_variably_sized_chunks())?;
    src.seek(SeekFrom::Start(current_pos))?;
    Ok(table)
}

impl ChunkTable {
    fn with_capacity(capacity: usize) -> Self {
        let vec = Vec::<ChunkTableEntry>::with_capacity(capacity);
        Self { 0: vec }
    }

    pub(super) fn len(&self) -> usize {
        return self.0.len();
    }
}

impl AsRef<[ChunkTableEntry]> for ChunkTable {
    fn as_ref(&self) -> &[ChunkTableEntry] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ChunkTable {
    type Item = <std::slice::Iter<'a, ChunkTableEntry> as Iterator>::Item;
    type IntoIter = std::slice::Iter<'a, ChunkTableEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<I> Index<I> for ChunkTable
where
    I: SliceIndex<[ChunkTableEntry]>,
{
    type Output = <I as SliceIndex<[ChunkTableEntry]>>::Output;

    fn index(&self, index: I) -> &Self::Output {
        &self.0[index]
    }
}

/// Updates the 'chunk table offset'
///
/// It is the first 8 byte (i64) of a Laszip compressed data
///
/// This function expects the position of the destination to be at the start of the chunk_table
/// (whether it is written or not).
///
/// This function also expects the i64 to have been already written/reserved
/// (even if its garbage bytes / 0s)
///
/// The position of the destination is untouched
pub(super) fn update_chunk_table_offset<W: Write + Seek>(
    dst: &mut W,
    offset_pos: SeekFrom,
) -> std::io::Result<()> {
    let start_of_chunk_table_pos = dst.seek(SeekFrom::Current(0))?;
    dst.seek(offset_pos)?;
    dst.write_i64::<LittleEndian>(start_of_chunk_table_pos as i64)?;
    dst.seek(SeekFrom::Start(start_of_chunk_table_pos))?;
    Ok(())
}

/// Write the chunk table
///
/// This function encodes and write the chunk table in the stream.
///
/// `contains_point_count` must be true when the chunks have a variable number
/// of points (the point count of each chunk is then range-coded alongside its
/// byte count); it must be false for fixed-size chunks, where the point count
/// is implied by the vlr's `chunk_size` and only the byte count is stored.
pub(super) fn write_chunk_table<W: Write>(
    mut stream: &mut W,
    chunk_table: &[ChunkTableEntry],
    contains_point_count: bool,
) -> std::io::Result<()> {
    // Write header
    stream.write_u32::<LittleEndian>(0)?;
    stream.write_u32::<LittleEndian>(chunk_table.len() as u32)?;

    let mut encoder = ArithmeticEncoder::new(&mut stream);
    let mut compressor = IntegerCompressorBuilder::new()
        .bits(32)
        .contexts(2)
        .build_initialized();

    let mut point_predictor = 0i32;
    let mut byte_predictor = 0i32;
    for entry in chunk_table {
        if contains_point_count {
            compressor.compress(
                &mut encoder,
                point_predictor,
                entry.point_count as i32,
                0,
            )?;
            point_predictor = entry.point_count as i32;
        }
        compressor.compress(&mut encoder, byte_predictor, entry.byte_count as i32, 1)?;
        byte_predictor = entry.byte_count as i32;
    }
    encoder.done()?;
    Ok(())
}
