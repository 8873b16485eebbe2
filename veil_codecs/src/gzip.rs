use flate2::Crc;

use veil_core::codec::{CodecError, DecodeStep, Decoder, EncodeStep, Encoder};

use crate::deflate::{DeflateDecoder, DeflateEncoder};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const METHOD_DEFLATE: u8 = 8;

// RFC 1952 FLG bits
const FHCRC: u8 = 1 << 1;
const FEXTRA: u8 = 1 << 2;
const FNAME: u8 = 1 << 3;
const FCOMMENT: u8 = 1 << 4;

/// Gzip encoder: a raw DEFLATE body wrapped in the RFC 1952 container —
/// 10-byte header up front, CRC32 + length trailer at the end. The
/// output is readable by any standard gzip tool.
pub struct GzipEncoder {
    deflate: DeflateEncoder,
    crc: Crc,
    /// Header/trailer bytes waiting to be drained into the output.
    pending: Vec<u8>,
    pending_pos: usize,
    header_queued: bool,
    deflate_done: bool,
}

impl GzipEncoder {
    /// Encoder at the given level (0 = none, 9 = best).
    pub fn new(level: u32) -> Self {
        Self {
            deflate: DeflateEncoder::new(level),
            crc: Crc::new(),
            pending: Vec::new(),
            pending_pos: 0,
            header_queued: false,
            deflate_done: false,
        }
    }

    fn queue_header(&mut self) {
        if !self.header_queued {
            self.header_queued = true;
            // minimal header: deflate method, no flags, zero mtime
            // (keeps output deterministic), unknown OS
            self.pending
                .extend_from_slice(&[0x1f, 0x8b, METHOD_DEFLATE, 0, 0, 0, 0, 0, 0, 255]);
        }
    }

    /// Move queued framing bytes into `output`, returning how many.
    fn drain_pending(&mut self, output: &mut [u8]) -> usize {
        let n = (self.pending.len() - self.pending_pos).min(output.len());
        output[..n].copy_from_slice(&self.pending[self.pending_pos..self.pending_pos + n]);
        self.pending_pos += n;
        if self.pending_pos == self.pending.len() {
            self.pending.clear();
            self.pending_pos = 0;
        }
        n
    }
}

impl Default for GzipEncoder {
    fn default() -> Self {
        Self::new(6)
    }
}

impl Encoder for GzipEncoder {
    fn encode(&mut self, input: &[u8], output: &mut [u8]) -> Result<EncodeStep, CodecError> {
        self.queue_header();
        let produced = self.drain_pending(output);
        if produced == output.len() {
            return Ok(EncodeStep {
                consumed: 0,
                produced,
            });
        }
        let step = self.deflate.encode(input, &mut output[produced..])?;
        self.crc.update(&input[..step.consumed]);
        Ok(EncodeStep {
            consumed: step.consumed,
            produced: produced + step.produced,
        })
    }

    fn flush(&mut self, output: &mut [u8]) -> Result<usize, CodecError> {
        self.queue_header();
        let mut produced = self.drain_pending(output);
        if produced < output.len() {
            produced += self.deflate.flush(&mut output[produced..])?;
        }
        Ok(produced)
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<(usize, bool), CodecError> {
        self.queue_header();
        let mut produced = self.drain_pending(output);
        if !self.deflate_done && produced < output.len() {
            let (n, done) = self.deflate.finish(&mut output[produced..])?;
            produced += n;
            if done {
                self.deflate_done = true;
                let mut trailer = [0u8; 8];
                trailer[..4].copy_from_slice(&self.crc.sum().to_le_bytes());
                trailer[4..].copy_from_slice(&self.crc.amount().to_le_bytes());
                self.pending.extend_from_slice(&trailer);
                produced += self.drain_pending(&mut output[produced..]);
            }
        }
        Ok((produced, self.deflate_done && self.pending.is_empty()))
    }
}

// ── header parsing ─────────────────────────────────────────────────────────

/// Incremental RFC 1952 header parser. Input may be split at any byte
/// boundary; each call consumes what it can and picks up where it left
/// off. Optional FEXTRA/FNAME/FCOMMENT fields are skipped, the optional
/// FHCRC is consumed but not verified.
struct HeaderParser {
    state: HeaderState,
    flags: u8,
}

#[derive(Clone, Copy)]
enum HeaderState {
    /// The fixed 10-byte prefix: magic, method, flags, mtime, xfl, os.
    Fixed { buf: [u8; 10], len: usize },
    /// Two-byte little-endian length of the FEXTRA field.
    ExtraLen { buf: [u8; 2], len: usize },
    /// FEXTRA payload still to skip.
    Extra { remaining: usize },
    /// NUL-terminated original file name.
    Name,
    /// NUL-terminated comment.
    Comment,
    /// Two-byte CRC16 of the header.
    HeaderCrc { remaining: usize },
    Done,
}

impl HeaderParser {
    fn new() -> Self {
        Self {
            state: HeaderState::Fixed {
                buf: [0; 10],
                len: 0,
            },
            flags: 0,
        }
    }

    fn is_done(&self) -> bool {
        matches!(self.state, HeaderState::Done)
    }

    fn after_extra(flags: u8) -> HeaderState {
        if flags & FNAME != 0 {
            HeaderState::Name
        } else {
            Self::after_name(flags)
        }
    }

    fn after_name(flags: u8) -> HeaderState {
        if flags & FCOMMENT != 0 {
            HeaderState::Comment
        } else {
            Self::after_comment(flags)
        }
    }

    fn after_comment(flags: u8) -> HeaderState {
        if flags & FHCRC != 0 {
            HeaderState::HeaderCrc { remaining: 2 }
        } else {
            HeaderState::Done
        }
    }

    /// Consume header bytes from `input`, returning how many were taken.
    fn advance(&mut self, input: &[u8]) -> Result<usize, CodecError> {
        let mut pos = 0;
        loop {
            match self.state {
                HeaderState::Fixed { mut buf, mut len } => {
                    let take = (10 - len).min(input.len() - pos);
                    buf[len..len + take].copy_from_slice(&input[pos..pos + take]);
                    len += take;
                    pos += take;
                    if len < 10 {
                        self.state = HeaderState::Fixed { buf, len };
                        return Ok(pos);
                    }
                    if buf[..2] != GZIP_MAGIC {
                        return Err(CodecError::Corrupt("not a gzip stream (bad magic)".into()));
                    }
                    if buf[2] != METHOD_DEFLATE {
                        return Err(CodecError::Corrupt(format!(
                            "unsupported gzip compression method {}",
                            buf[2]
                        )));
                    }
                    self.flags = buf[3];
                    self.state = if self.flags & FEXTRA != 0 {
                        HeaderState::ExtraLen {
                            buf: [0; 2],
                            len: 0,
                        }
                    } else {
                        Self::after_extra(self.flags)
                    };
                }
                HeaderState::ExtraLen { mut buf, mut len } => {
                    let take = (2 - len).min(input.len() - pos);
                    buf[len..len + take].copy_from_slice(&input[pos..pos + take]);
                    len += take;
                    pos += take;
                    if len < 2 {
                        self.state = HeaderState::ExtraLen { buf, len };
                        return Ok(pos);
                    }
                    self.state = HeaderState::Extra {
                        remaining: u16::from_le_bytes(buf) as usize,
                    };
                }
                HeaderState::Extra { remaining } => {
                    let take = remaining.min(input.len() - pos);
                    pos += take;
                    if take < remaining {
                        self.state = HeaderState::Extra {
                            remaining: remaining - take,
                        };
                        return Ok(pos);
                    }
                    self.state = Self::after_extra(self.flags);
                }
                HeaderState::Name => match input[pos..].iter().position(|&b| b == 0) {
                    Some(i) => {
                        pos += i + 1;
                        self.state = Self::after_name(self.flags);
                    }
                    None => return Ok(input.len()),
                },
                HeaderState::Comment => match input[pos..].iter().position(|&b| b == 0) {
                    Some(i) => {
                        pos += i + 1;
                        self.state = Self::after_comment(self.flags);
                    }
                    None => return Ok(input.len()),
                },
                HeaderState::HeaderCrc { remaining } => {
                    let take = remaining.min(input.len() - pos);
                    pos += take;
                    if take < remaining {
                        self.state = HeaderState::HeaderCrc {
                            remaining: remaining - take,
                        };
                        return Ok(pos);
                    }
                    self.state = HeaderState::Done;
                }
                HeaderState::Done => return Ok(pos),
            }
        }
    }
}

// ── decoder ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
enum Stage {
    Header,
    Body,
    Trailer,
    Done,
}

/// Gzip decoder: parses the RFC 1952 header (including the optional
/// fields standard tools may emit), inflates the raw DEFLATE body, and
/// verifies the CRC32 + length trailer before reporting the stream
/// ended. Trailing bytes after one member are left unconsumed.
pub struct GzipDecoder {
    header: HeaderParser,
    inner: DeflateDecoder,
    crc: Crc,
    trailer: [u8; 8],
    trailer_len: usize,
    stage: Stage,
}

impl GzipDecoder {
    pub fn new() -> Self {
        Self {
            header: HeaderParser::new(),
            inner: DeflateDecoder::new(),
            crc: Crc::new(),
            trailer: [0; 8],
            trailer_len: 0,
            stage: Stage::Header,
        }
    }
}

impl Default for GzipDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for GzipDecoder {
    fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<DecodeStep, CodecError> {
        let mut consumed = 0;
        let mut produced = 0;
        loop {
            match self.stage {
                Stage::Header => {
                    consumed += self.header.advance(&input[consumed..])?;
                    if self.header.is_done() {
                        self.stage = Stage::Body;
                    } else {
                        return Ok(DecodeStep {
                            consumed,
                            produced,
                            ended: false,
                        });
                    }
                }
                Stage::Body => {
                    let step = self.inner.decode(&input[consumed..], output)?;
                    consumed += step.consumed;
                    self.crc.update(&output[..step.produced]);
                    produced = step.produced;
                    if step.ended {
                        self.stage = Stage::Trailer;
                    } else {
                        return Ok(DecodeStep {
                            consumed,
                            produced,
                            ended: false,
                        });
                    }
                }
                Stage::Trailer => {
                    let take = (8 - self.trailer_len).min(input.len() - consumed);
                    self.trailer[self.trailer_len..self.trailer_len + take]
                        .copy_from_slice(&input[consumed..consumed + take]);
                    self.trailer_len += take;
                    consumed += take;
                    if self.trailer_len < 8 {
                        return Ok(DecodeStep {
                            consumed,
                            produced,
                            ended: false,
                        });
                    }
                    let t = self.trailer;
                    let expected_crc = u32::from_le_bytes([t[0], t[1], t[2], t[3]]);
                    let expected_len = u32::from_le_bytes([t[4], t[5], t[6], t[7]]);
                    if expected_crc != self.crc.sum() {
                        return Err(CodecError::Corrupt(format!(
                            "gzip checksum mismatch: expected {:08x}, got {:08x}",
                            expected_crc,
                            self.crc.sum()
                        )));
                    }
                    if expected_len != self.crc.amount() {
                        return Err(CodecError::Corrupt(format!(
                            "gzip length mismatch: trailer says {} bytes, got {}",
                            expected_len,
                            self.crc.amount()
                        )));
                    }
                    self.stage = Stage::Done;
                    return Ok(DecodeStep {
                        consumed,
                        produced,
                        ended: true,
                    });
                }
                Stage::Done => {
                    return Ok(DecodeStep {
                        consumed,
                        produced,
                        ended: true,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Header with every optional field set: FEXTRA, FNAME, FCOMMENT, FHCRC.
    fn full_header() -> Vec<u8> {
        let mut h = vec![
            0x1f,
            0x8b,
            METHOD_DEFLATE,
            FEXTRA | FNAME | FCOMMENT | FHCRC,
            0,
            0,
            0,
            0,
            0,
            255,
        ];
        h.extend_from_slice(&3u16.to_le_bytes()); // XLEN
        h.extend_from_slice(b"abc"); // extra payload
        h.extend_from_slice(b"file.txt\0");
        h.extend_from_slice(b"a comment\0");
        h.extend_from_slice(&[0xaa, 0xbb]); // header crc, unverified
        h
    }

    #[test]
    fn parses_minimal_header_in_one_call() {
        let mut parser = HeaderParser::new();
        let header = [0x1f, 0x8b, 8, 0, 0, 0, 0, 0, 0, 255];
        let consumed = parser.advance(&header).unwrap();
        assert_eq!(consumed, 10);
        assert!(parser.is_done());
    }

    #[test]
    fn parses_full_header_byte_by_byte() {
        let header = full_header();
        let mut parser = HeaderParser::new();
        let mut total = 0;
        for b in &header {
            assert!(!parser.is_done());
            total += parser.advance(std::slice::from_ref(b)).unwrap();
        }
        assert!(parser.is_done());
        assert_eq!(total, header.len());
    }

    #[test]
    fn leaves_body_bytes_unconsumed() {
        let mut header = full_header();
        let header_len = header.len();
        header.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let mut parser = HeaderParser::new();
        let consumed = parser.advance(&header).unwrap();
        assert!(parser.is_done());
        assert_eq!(consumed, header_len);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut parser = HeaderParser::new();
        let err = parser.advance(b"PK\x03\x04\0\0\0\0\0\0").unwrap_err();
        assert!(matches!(err, CodecError::Corrupt(_)));
    }

    #[test]
    fn rejects_unknown_method() {
        let mut parser = HeaderParser::new();
        let err = parser
            .advance(&[0x1f, 0x8b, 7, 0, 0, 0, 0, 0, 0, 255])
            .unwrap_err();
        assert!(matches!(err, CodecError::Corrupt(_)));
    }
}
