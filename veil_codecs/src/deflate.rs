use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use veil_core::codec::{CodecError, DecodeStep, Decoder, EncodeStep, Encoder};

/// Clamp a 0–9 level to what the deflate backend accepts.
pub(crate) fn compression_level(level: u32) -> Compression {
    Compression::new(level.min(9))
}

/// Raw DEFLATE encoder: compressed blocks with no container header,
/// trailer, or checksum. The output is only meaningful to a decoder that
/// already knows it is raw deflate.
pub struct DeflateEncoder {
    raw: Compress,
}

impl DeflateEncoder {
    /// Encoder at the given level (0 = none, 9 = best).
    pub fn new(level: u32) -> Self {
        Self {
            raw: Compress::new(compression_level(level), false),
        }
    }

    /// Compress with `flush` into `output`, reporting byte deltas.
    fn step(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushCompress,
    ) -> Result<(usize, usize, Status), CodecError> {
        let before_in = self.raw.total_in();
        let before_out = self.raw.total_out();
        let status = self
            .raw
            .compress(input, output, flush)
            .map_err(|e| CodecError::Internal(e.to_string()))?;
        Ok((
            (self.raw.total_in() - before_in) as usize,
            (self.raw.total_out() - before_out) as usize,
            status,
        ))
    }
}

impl Default for DeflateEncoder {
    fn default() -> Self {
        Self {
            raw: Compress::new(Compression::default(), false),
        }
    }
}

impl Encoder for DeflateEncoder {
    fn encode(&mut self, input: &[u8], output: &mut [u8]) -> Result<EncodeStep, CodecError> {
        let (consumed, produced, _) = self.step(input, output, FlushCompress::None)?;
        Ok(EncodeStep { consumed, produced })
    }

    fn flush(&mut self, output: &mut [u8]) -> Result<usize, CodecError> {
        // Status::BufError here just means "nothing left to flush"
        let (_, produced, _) = self.step(&[], output, FlushCompress::Sync)?;
        Ok(produced)
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<(usize, bool), CodecError> {
        let (_, produced, status) = self.step(&[], output, FlushCompress::Finish)?;
        Ok((produced, status == Status::StreamEnd))
    }
}

/// Raw DEFLATE decoder, the mirror of [`DeflateEncoder`].
pub struct DeflateDecoder {
    raw: Decompress,
}

impl DeflateDecoder {
    pub fn new() -> Self {
        Self {
            raw: Decompress::new(false),
        }
    }
}

impl Default for DeflateDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for DeflateDecoder {
    fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<DecodeStep, CodecError> {
        let before_in = self.raw.total_in();
        let before_out = self.raw.total_out();
        let status = self
            .raw
            .decompress(input, output, FlushDecompress::None)
            .map_err(|e| CodecError::Corrupt(e.to_string()))?;
        Ok(DecodeStep {
            consumed: (self.raw.total_in() - before_in) as usize,
            produced: (self.raw.total_out() - before_out) as usize,
            ended: status == Status::StreamEnd,
        })
    }
}
