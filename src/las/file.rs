//! A minimal LAS/LAZ header + VLR reader, just enough to locate the point
//! data and, for compressed files, the laszip VLR describing how to decode
//! it. Not a general purpose LAS writer: header field rewriting, CRS VLRs,
//! and EVLRs are out of scope.
use crate::las::laszip::{LasZipDecompressor, LazVlr};
use crate::LasZipError;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};

const LAS_MAGIC: &[u8; 4] = b"LASF";

#[derive(Debug)]
pub struct QuickHeader {
    pub major: u8,
    pub minor: u8,
    pub offset_to_points: u32,
    pub num_vlrs: u32,
    /// The point format id with the compression flag bits already stripped.
    pub point_format_id: u8,
    pub is_compressed: bool,
    pub point_size: u16,
    pub num_points: u64,
    header_size: u16,
}

impl QuickHeader {
    pub fn read_from<R: Read + Seek>(src: &mut R) -> crate::Result<Self> {
        src.seek(SeekFrom::Start(0))?;
        let mut magic = [0u8; 4];
        src.read_exact(&mut magic)?;
        if &magic != LAS_MAGIC {
            return Err(LasZipError::MagicMismatch);
        }

        src.seek(SeekFrom::Start(24))?;
        let major = src.read_u8()?;
        let minor = src.read_u8()?;

        src.seek(SeekFrom::Start(94))?;
        let header_size = src.read_u16::<LittleEndian>()?;
        let offset_to_points = src.read_u32::<LittleEndian>()?;
        let num_vlrs = src.read_u32::<LittleEndian>()?;
        let raw_point_format_id = src.read_u8()?;
        let point_size = src.read_u16::<LittleEndian>()?;
        let num_points = if major == 1 && minor == 4 {
            src.seek(SeekFrom::Start(247))?;
            src.read_u64::<LittleEndian>()?
        } else {
            u64::from(src.read_u32::<LittleEndian>()?)
        };

        let compressed_bit = raw_point_format_id & 0x80 != 0;
        let reserved_bit = raw_point_format_id & 0x40 != 0;
        if compressed_bit && reserved_bit {
            return Err(LasZipError::InvalidCompressionFlags {
                point_format_id: raw_point_format_id,
            });
        }

        Ok(Self {
            major,
            minor,
            offset_to_points,
            num_vlrs,
            point_format_id: raw_point_format_id & 0x3F,
            is_compressed: compressed_bit,
            point_size,
            num_points,
            header_size,
        })
    }
}

pub struct Vlr {
    user_id: [u8; 16],
    record_id: u16,
    #[allow(dead_code)]
    description: [u8; 32],
    data: Vec<u8>,
}

impl Vlr {
    pub fn read_from<R: Read>(src: &mut R) -> std::io::Result<Self> {
        src.read_u16::<LittleEndian>()?; // reserved
        let mut user_id = [0u8; 16];
        src.read_exact(&mut user_id)?;

        let record_id = src.read_u16::<LittleEndian>()?;
        let record_length = src.read_u16::<LittleEndian>()?;

        let mut description = [0u8; 32];
        src.read_exact(&mut description)?;

        let mut data = vec![0u8; record_length as usize];
        src.read_exact(&mut data)?;

        Ok(Self {
            user_id,
            record_id,
            description,
            data,
        })
    }

    pub fn is_laszip_vlr(&self) -> bool {
        self.record_id == LazVlr::RECORD_ID
            && String::from_utf8_lossy(&self.user_id).trim_end_matches('\0') == LazVlr::USER_ID
    }
}

/// Object-safe union of [`Read`] and [`Seek`], so a [`SimpleReader`] can be
/// built generically over any reader and then boxed away.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

enum PointSource<'a> {
    Raw(Box<dyn ReadSeek + Send + 'a>),
    Compressed(LasZipDecompressor<'a, Box<dyn ReadSeek + Send + 'a>>),
}

/// Reads the points of a LAS or LAZ file one at a time, transparently
/// decompressing when the file is flagged as compressed.
pub struct SimpleReader<'a> {
    pub header: QuickHeader,
    pub laszip_vlr: Option<LazVlr>,
    point_size: usize,
    points_read: u64,
    source: PointSource<'a>,
}

impl<'a> SimpleReader<'a> {
    pub fn new<R: Read + Seek + Send + 'a>(src: R) -> crate::Result<Self> {
        let mut src: Box<dyn ReadSeek + Send + 'a> = Box::new(src);
        let header = QuickHeader::read_from(&mut src)?;
        src.seek(SeekFrom::Start(header.header_size as u64))?;

        let mut laszip_vlr = None;
        for _ in 0..header.num_vlrs {
            let vlr = Vlr::read_from(&mut src)?;
            if vlr.is_laszip_vlr() {
                laszip_vlr = Some(LazVlr::from_buffer(&vlr.data)?);
            }
        }

        src.seek(SeekFrom::Start(header.offset_to_points as u64))?;
        let point_size = header.point_size as usize;

        let source = if header.is_compressed {
            let vlr = laszip_vlr.clone().ok_or(LasZipError::MissingLaszipVlr)?;
            PointSource::Compressed(LasZipDecompressor::new(src, vlr)?)
        } else {
            PointSource::Raw(src)
        };

        Ok(Self {
            header,
            laszip_vlr,
            point_size,
            points_read: 0,
            source,
        })
    }

    /// Reads and decompresses (if needed) the next point, returning its raw
    /// LAS-ordered, little-endian byte layout. Returns `None` once all of
    /// the header's declared points have been read.
    pub fn read_next(&mut self) -> Option<std::io::Result<Vec<u8>>> {
        if self.points_read >= self.header.num_points {
            return None;
        }
        let mut buf = vec![0u8; self.point_size];
        let result = match &mut self.source {
            PointSource::Raw(src) => src.read_exact(&mut buf),
            PointSource::Compressed(decompressor) => decompressor.decompress_one(&mut buf),
        };
        match result {
            Ok(()) => {
                self.points_read += 1;
                Some(Ok(buf))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

impl<'a> Read for SimpleReader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.source {
            PointSource::Raw(src) => src.read(buf),
            PointSource::Compressed(decompressor) => {
                let n_points_fitting = buf.len() / self.point_size;
                let remaining = (self.header.num_points - self.points_read) as usize;
                let n_points = n_points_fitting.min(remaining);
                if n_points == 0 {
                    return Ok(0);
                }
                let n_bytes = n_points * self.point_size;
                decompressor.decompress_many(&mut buf[..n_bytes])?;
                self.points_read += n_points as u64;
                Ok(n_bytes)
            }
        }
    }
}
