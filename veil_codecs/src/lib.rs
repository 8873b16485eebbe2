mod deflate;
mod gzip;

pub use deflate::{DeflateDecoder, DeflateEncoder};
pub use gzip::{GzipDecoder, GzipEncoder};

use veil_core::codec::{Decoder, Encoder};

/// Compression level used when the caller does not pick one.
pub const DEFAULT_LEVEL: u32 = 6;

/// Framing of the compressed byte stream, fixed when a stream is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Raw DEFLATE blocks, no header/trailer/checksum. Smallest
    /// overhead, but only meaningful to a decoder configured the same
    /// way (or framed at a higher layer).
    Deflate,
    /// Self-describing gzip container (RFC 1952), interoperable with
    /// standard general-purpose tools.
    Gzip,
}

/// Build the encoder/decoder pair for a stream in the given format.
///
/// Both halves are returned so a
/// [`CompressionStream`](veil_core::CompressionStream) can serve either
/// direction; each instance still drives only one of them per session.
pub fn codec_pair(format: Format, level: u32) -> (Box<dyn Encoder>, Box<dyn Decoder>) {
    match format {
        Format::Deflate => (
            Box::new(DeflateEncoder::new(level)),
            Box::new(DeflateDecoder::new()),
        ),
        Format::Gzip => (
            Box::new(GzipEncoder::new(level)),
            Box::new(GzipDecoder::new()),
        ),
    }
}
