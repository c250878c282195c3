use super::chunk_table::{self, ChunkTable};
use super::{details, CompressorType, LazVlr};
use crate::record::RecordDecompressor;
use crate::LasZipError;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};

/// Struct that handles the decompression of the points written in a LAZ file
pub struct LasZipDecompressor<'a, R: Read + Seek + 'a> {
    vlr: LazVlr,
    record_decompressor: Box<dyn RecordDecompressor<R> + Send + 'a>,
    chunk_points_read: u64,
    offset_to_chunk_table: i64,
    data_start: u64,
    chunk_table: Option<ChunkTable>,
    current_chunk: usize,
}

impl<'a, R: Read + Seek + Send + 'a> LasZipDecompressor<'a, R> {
    /// Creates a new instance from a data source of compressed points
    /// and the LazVlr describing the compressed data
    pub fn new(mut source: R, vlr: LazVlr) -> crate::Result<Self> {
        if vlr.compressor != CompressorType::PointWiseChunked
            && vlr.compressor != CompressorType::LayeredChunked
        {
            return Err(LasZipError::UnsupportedCompressorType(vlr.compressor));
        }

        let offset_to_chunk_table = source.read_i64::<LittleEndian>()?;
        let data_start = source.seek(SeekFrom::Current(0))?;
        let record_decompressor =
            details::record_decompressor_from_laz_items(&vlr.items(), source)?;

        let mut decompressor = Self {
            vlr,
            record_decompressor,
            chunk_points_read: 0,
            offset_to_chunk_table,
            data_start,
            chunk_table: None,
            current_chunk: 0,
        };
        if decompressor.vlr.uses_variably_sized_chunks() {
            // Variable-size chunks can only be told apart by their point
            // count, which is only known once the chunk table has been read.
            decompressor.read_chunk_table()?;
        }
        Ok(decompressor)
    }

    /// Creates a new instance from a data source of compressed points
    /// and the `record data` of the laszip vlr
    pub fn new_with_record_data(source: R, laszip_vlr_record_data: &[u8]) -> crate::Result<Self> {
        let vlr = LazVlr::from_buffer(laszip_vlr_record_data)?;
        Self::new(source, vlr)
    }

    /// Decompress the next point and write the uncompressed data to the out buffer.
    ///
    /// - The buffer should have at least enough byte to store the decompressed data
    /// - The data is written in the buffer exactly as it would have been in a LAS File
    ///     in Little Endian order,
    pub fn decompress_one(&mut self, mut out: &mut [u8]) -> std::io::Result<()> {
        if self.chunk_points_read == self.current_chunk_point_count() {
            self.current_chunk += 1;
            self.reset_for_new_chunk();
        }
        self.record_decompressor.decompress_next(&mut out)?;
        self.chunk_points_read += 1;
        Ok(())
    }

    /// Decompress as many points as the `out` slice can hold
    ///
    /// # Note
    ///
    /// If the `out` slice contains more space than there are points
    /// the function will still decompress and thus and error will occur
    pub fn decompress_many(&mut self, out: &mut [u8]) -> std::io::Result<()> {
        for point in out.chunks_exact_mut(self.vlr.items_size() as usize) {
            self.decompress_one(point)?;
        }
        Ok(())
    }

    pub fn vlr(&self) -> &LazVlr {
        &self.vlr
    }

    /// Seeks to the point designed by the index
    ///
    /// # Important
    ///
    /// Seeking in compressed data has a higher cost than non compressed data
    /// because the stream has to be moved to the start of the chunk
    /// and then we have to decompress points in the chunk until we reach the
    /// one we want.
    pub fn seek(&mut self, point_idx: u64) -> crate::Result<()> {
        if self.chunk_table.is_none() {
            self.read_chunk_table()?;
        }
        let table = self.chunk_table.as_ref().expect("chunk table just loaded");

        let mut points_before_chunk = 0u64;
        let mut chunk_byte_start = self.data_start;
        for (chunk_idx, entry) in table.into_iter().enumerate() {
            if point_idx < points_before_chunk + entry.point_count {
                let delta = point_idx - points_before_chunk;
                self.record_decompressor
                    .get_mut()
                    .seek(SeekFrom::Start(chunk_byte_start))?;
                self.current_chunk = chunk_idx;
                self.reset_for_new_chunk();

                let mut tmp_out = vec![0u8; self.record_decompressor.record_size()];
                for _ in 0..delta {
                    self.decompress_one(&mut tmp_out)?;
                }
                return Ok(());
            }
            points_before_chunk += entry.point_count;
            chunk_byte_start += entry.byte_count;
        }

        // Out of bounds: seek to the end so the next decompress call fails
        // with a clean "unexpected end of input" error.
        self.record_decompressor.get_mut().seek(SeekFrom::End(0))?;
        Ok(())
    }

    fn current_chunk_point_count(&self) -> u64 {
        match &self.chunk_table {
            Some(table) if self.current_chunk < table.len() => {
                table[self.current_chunk].point_count
            }
            _ => self.vlr.chunk_size() as u64,
        }
    }

    fn reset_for_new_chunk(&mut self) {
        self.chunk_points_read = 0;
        self.record_decompressor.reset();
        //we can safely unwrap here, as set_field would have failed in the ::new()
        self.record_decompressor
            .set_fields_from(&self.vlr.items())
            .unwrap();
    }

    fn read_chunk_table(&mut self) -> crate::Result<()> {
        let stream = self.record_decompressor.get_mut();
        let table =
            chunk_table::read_chunk_table_at_offset(stream, &self.vlr, self.offset_to_chunk_table)?;
        self.chunk_table = Some(table);
        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.record_decompressor.box_into_inner()
    }

    pub fn get_mut(&mut self) -> &mut R {
        self.record_decompressor.get_mut()
    }

    pub fn get(&self) -> &R {
        self.record_decompressor.get()
    }
}

/// Decompresses all points from the buffer
///
/// The `compressed_points_data` slice must contain all the laszip data
/// that means:
///   1) The offset to the chunk table (i64)
///   2) the compressed points
///   3) the chunk table (optional)
///
///
/// This fn will decompress as many points as the `decompress_points` can hold.
///
/// # Important
///
/// In a LAZ file, the chunk table offset is counted from the start of the
/// LAZ file. Here since we only have the buffer points data, you must make
/// sure the offset is counted since the start of point data.
///
/// So you should update the value before calling this function.
/// Otherwise you will get an IoError like 'failed to fill whole buffer'
/// due to this function seeking past the end of the data.
pub fn decompress_buffer(
    compressed_points_data: &[u8],
    decompressed_points: &mut [u8],
    laz_vlr: LazVlr,
) -> crate::Result<()> {
    let point_size = laz_vlr.items_size() as usize;
    if decompressed_points.len() % point_size != 0 {
        Err(LasZipError::BufferLenNotMultipleOfPointSize {
            buffer_len: decompressed_points.len(),
            point_size,
        })
    } else {
        let src = std::io::Cursor::new(compressed_points_data);
        LasZipDecompressor::new(src, laz_vlr).and_then(|mut decompressor| {
            decompressor.decompress_many(decompressed_points)?;
            Ok(())
        })
    }
}
