use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Write};

/// Gzip-frame `data` at the default compression level. Output is not
/// guaranteed byte-stable across runs; compare decompressed content.
pub fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
