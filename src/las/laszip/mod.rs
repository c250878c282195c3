//! Everything related to reading and writing the LasZip VLR, and to driving
//! the compression/decompression of the points it describes.
mod chunk_table;
mod compression;
mod decompression;
mod details;
mod vlr;

pub use compression::{compress_buffer, LasZipCompressor};
pub use decompression::{decompress_buffer, LasZipDecompressor};
pub use vlr::{
    CompressorType, DefaultVersion, LazItem, LazItemRecordBuilder, LazItemType, LazItems, LazVlr,
    LazVlrBuilder, Version1, Version2, Version3,
};
