//! Compression codec dispatch.
//!
//! Codecs are registry crates, not hand-rolled: snappy via `snap` raw blocks,
//! gzip via `flate2`, lz4 via `lz4_flex` size-prepended blocks (feature
//! `lz4`, on by default). All failures surface as `io::Error` so the caller
//! sees one error shape regardless of codec.

use std::io;

use pulse_core::Compression;

/// Compress `data` with the given codec.
pub fn compress(data: &[u8], codec: Compression) -> io::Result<Vec<u8>> {
    match codec {
        Compression::None => Ok(data.to_vec()),
        Compression::Snappy => snap::raw::Encoder::new()
            .compress_vec(data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        #[cfg(feature = "lz4")]
        Compression::Lz4 => Ok(lz4_flex::block::compress_prepend_size(data)),
        #[cfg(not(feature = "lz4"))]
        Compression::Lz4 => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "lz4 support not compiled in",
        )),
        Compression::Gzip => {
            use io::Write;
            let mut encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
    }
}

/// Decompress `data` previously compressed with the given codec.
pub fn decompress(data: &[u8], codec: Compression) -> io::Result<Vec<u8>> {
    match codec {
        Compression::None => Ok(data.to_vec()),
        Compression::Snappy => snap::raw::Decoder::new()
            .decompress_vec(data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        #[cfg(feature = "lz4")]
        Compression::Lz4 => lz4_flex::block::decompress_size_prepended(data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        #[cfg(not(feature = "lz4"))]
        Compression::Lz4 => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "lz4 support not compiled in",
        )),
        Compression::Gzip => {
            use io::Read;
            let mut decoder = flate2::read::GzDecoder::new(data);
            let mut out = Vec::new();
            let _ = decoder.read_to_end(&mut out)?;
            Ok(out)
        }
    }
}

/// Whether this build can decompress the given codec.
#[must_use]
pub fn supported(codec: Compression) -> bool {
    match codec {
        Compression::None | Compression::Snappy | Compression::Gzip => true,
        Compression::Lz4 => cfg!(feature = "lz4"),
    }
}
