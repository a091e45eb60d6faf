// pg-s3-backup/src/backup/archive.rs
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

use crate::errors::Result;

/// Gzip-compresses a dump payload held in memory.
pub fn gzip_compress(payload: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(payload.len() / 4), Compression::default());
    encoder.write_all(payload)?;
    Ok(encoder.finish()?)
}

/// Reverses [`gzip_compress`]. Fails with an I/O error on data that is not gzip.
pub fn gzip_decompress(payload: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(payload);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}
