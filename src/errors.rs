//! Definitions of error related thins.

use crate::las::laszip::{CompressorType, LazItemType};
use std::fmt;

/// Errors of this crate
#[derive(Debug)]
#[non_exhaustive]
pub enum LasZipError {
    /// The Laz item it not known
    UnknownLazItem(u16),
    /// The compression version used for the item is not supported
    UnsupportedLazItemVersion(LazItemType, u16),
    /// The type of compressor used is not known
    UnknownCompressorType(u16),
    /// The type of compressor exists but it is not supported
    UnsupportedCompressorType(CompressorType),
    /// The point format id is not supported
    UnsupportedPointFormat(u8),
    /// Wrapper around and io error from the std lib
    IoError(std::io::Error),
    BufferLenNotMultipleOfPointSize {
        buffer_len: usize,
        point_size: usize,
    },
    /// The chunk table could not be found in the file
    /// and it is required for the operation.
    MissingChunkTable,
    /// The first four bytes of the file are not `LASF`
    MagicMismatch,
    /// Both the compressed and uncompressed bits of `point_format_id` are
    /// set, or neither is set when a compressed file was expected
    InvalidCompressionFlags { point_format_id: u8 },
    /// `point_format_id` has its compressed bit set but no VLR with
    /// user id "laszip encoded" and record id 22204 was found
    MissingLaszipVlr,
    /// The chunk table's version is not 0, its offset is -1, or its
    /// chunk size is `0xFFFFFFFF` in a context that does not support it
    UnsupportedChunkTable,
    /// The source ran out of bytes before the decoder expected it to
    UnexpectedEndOfInput,
    /// The range decoder's internal invariants broke, the chunk that
    /// produced this error cannot be trusted
    DecodeMismatch,
}

impl From<std::io::Error> for LasZipError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            LasZipError::UnexpectedEndOfInput
        } else {
            LasZipError::IoError(e)
        }
    }
}

impl fmt::Display for LasZipError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            LasZipError::UnknownLazItem(t) => write!(f, "Item with type code: {} is unknown", t),
            LasZipError::UnsupportedLazItemVersion(item_type, version) => write!(
                f,
                "Item {:?} with compression version: {} is not supported",
                item_type, version
            ),
            LasZipError::UnknownCompressorType(compressor_type) => {
                write!(f, "Compressor type {} is not valid", compressor_type)
            }
            LasZipError::UnsupportedCompressorType(compressor_type) => {
                write!(f, "Compressor type {:?} is not supported", compressor_type)
            }
            LasZipError::IoError(e) => write!(f, "IoError: {}", e),

            LasZipError::BufferLenNotMultipleOfPointSize {
                buffer_len: bl,
                point_size: ps,
            } => write!(
                f,
                "The len of the buffer ({}) is not a multiple of the point size {}",
                bl, ps
            ),
            LasZipError::UnsupportedPointFormat(id) => {
                write!(f, "Point format {} is not supported", id)
            }
            LasZipError::MissingChunkTable => write!(f, "The chunk table could not be found"),
            LasZipError::MagicMismatch => {
                write!(f, "The first four bytes of the file are not 'LASF'")
            }
            LasZipError::InvalidCompressionFlags { point_format_id } => write!(
                f,
                "point_format_id {} has an invalid combination of compression flags set",
                point_format_id
            ),
            LasZipError::MissingLaszipVlr => write!(
                f,
                "The file is flagged as compressed but no laszip VLR was found"
            ),
            LasZipError::UnsupportedChunkTable => {
                write!(f, "The chunk table is malformed or uses an unsupported layout")
            }
            LasZipError::UnexpectedEndOfInput => {
                write!(f, "The input ended before the expected amount of data was read")
            }
            LasZipError::DecodeMismatch => write!(
                f,
                "The range decoder's invariants broke, the data is corrupted"
            ),
        }
    }
}

impl std::error::Error for LasZipError {}
