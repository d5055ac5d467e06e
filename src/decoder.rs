use log::{debug, warn};
use nom::{
    bytes::complete::{tag, take},
    number::complete::be_u32,
    IResult,
};

use crate::{
    chunks::{record::FRAMING_LEN, ChunkRecord, ChunkType, TextDecoder},
    crc,
    error::{ChunkField, CrcMismatch, Error, StructuralError},
};

/// The first eight bytes of every PNG file.
pub const PNG_SIGNATURE: [u8; 8] = *b"\x89PNG\x0d\x0a\x1a\x0a";

/// Largest data length PNG allows in a single chunk.
pub const MAX_CHUNK_LENGTH: u32 = (1 << 31) - 1;

fn parse_signature(input: &[u8]) -> IResult<&[u8], &[u8]> {
    tag(&PNG_SIGNATURE[..])(input)
}

/// Strips the PNG signature, returning the chunk stream that follows it.
pub fn split_signature(input: &[u8]) -> Result<&[u8], Error> {
    let (rest, _) = parse_signature(input).map_err(|_| Error::InvalidSignature)?;
    Ok(rest)
}

/// What to do when a chunk's stored CRC is wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrcPolicy {
    /// Don't compute CRCs at all.
    Ignore,
    /// Yield the chunk with [`ChunkRecord::crc_mismatch`] set.
    #[default]
    Flag,
    /// Yield [`Error::Integrity`] and stop.
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamOptions {
    pub crc_policy: CrcPolicy,
    /// Fail with [`StructuralError::MissingHeader`] unless the first chunk is `IHDR`.
    pub require_header: bool,
    pub text: TextDecoder,
}

impl StreamOptions {
    pub fn strict() -> Self {
        Self {
            crc_policy: CrcPolicy::Fatal,
            require_header: true,
            text: TextDecoder::default(),
        }
    }

    pub fn crc_policy(mut self, crc_policy: CrcPolicy) -> Self {
        self.crc_policy = crc_policy;
        self
    }

    pub fn require_header(mut self, require_header: bool) -> Self {
        self.require_header = require_header;
        self
    }

    pub fn max_text_len(mut self, max_text_len: usize) -> Self {
        self.text.max_text_len = max_text_len;
        self
    }
}

/// Walks the chunks following a PNG signature, one [`ChunkRecord`] at a time.
///
/// The stream is finished after it yields `IEND` or any error other than a
/// flagged CRC mismatch; from then on it only returns `None`.
#[derive(Debug, Clone)]
pub struct ChunkStream<'a> {
    source: &'a [u8],
    offset: usize,
    finished: bool,
    options: StreamOptions,
}

impl<'a> ChunkStream<'a> {
    /// `source` must start right after the signature.
    pub fn new(source: &'a [u8]) -> Self {
        Self::with_options(source, StreamOptions::default())
    }

    pub fn with_options(source: &'a [u8], options: StreamOptions) -> Self {
        Self {
            source,
            offset: 0,
            finished: false,
            options,
        }
    }

    /// Checks the signature of a whole PNG file and walks the chunks after it.
    pub fn from_png(file: &'a [u8], options: StreamOptions) -> Result<Self, Error> {
        Ok(Self::with_options(split_signature(file)?, options))
    }

    /// Offset of the next chunk, counted from the end of the signature.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn read_chunk(&mut self) -> Result<ChunkRecord<'a>, Error> {
        let start_offset = self.offset;
        if self.source.is_empty() {
            return Err(StructuralError::MissingEndMarker {
                offset: start_offset,
            }
            .into());
        }

        let (rest, length) =
            be_u32(self.source).map_err(|_: nom::Err<nom::error::Error<&[u8]>>| {
                self.truncated(ChunkField::Length, 4, self.source.len())
            })?;
        let (rest, tag) = take_field(rest, 4)
            .map_err(|available| self.truncated(ChunkField::Type, 4, available))?;
        let tag: &[u8; 4] = tag
            .try_into()
            .map_err(|_| self.truncated(ChunkField::Type, 4, tag.len()))?;
        let chunk_type = ChunkType::classify(tag)
            .map_err(|e| StructuralError::from_tag(e, start_offset))?;

        if self.options.require_header && start_offset == 0 && chunk_type != ChunkType::IHDR {
            return Err(StructuralError::MissingHeader {
                offset: start_offset,
                found: chunk_type,
            }
            .into());
        }
        if length > MAX_CHUNK_LENGTH {
            return Err(StructuralError::InvalidLength {
                offset: start_offset,
                length,
            }
            .into());
        }

        let (rest, data) = take_field(rest, length as usize)
            .map_err(|available| self.truncated(ChunkField::Data, length as usize, available))?;
        let (rest, stored_crc) =
            be_u32(rest).map_err(|_: nom::Err<nom::error::Error<&[u8]>>| {
                self.truncated(ChunkField::Crc, 4, rest.len())
            })?;

        let crc_mismatch = match self.options.crc_policy {
            CrcPolicy::Ignore => None,
            CrcPolicy::Flag | CrcPolicy::Fatal => {
                let actual = crc::chunk_crc(tag, data);
                (actual != stored_crc).then_some(CrcMismatch {
                    offset: start_offset,
                    chunk_type,
                    expected: stored_crc,
                    actual,
                })
            }
        };
        if let Some(mismatch) = crc_mismatch.as_ref() {
            warn!("{mismatch}");
            if self.options.crc_policy == CrcPolicy::Fatal {
                return Err(mismatch.clone().into());
            }
        }

        let text = chunk_type.is_text_bearing().then(|| {
            let text = self.options.text.decode(chunk_type, data);
            if let Err(e) = &text {
                warn!("{chunk_type} chunk at offset {start_offset}: {e}");
            }
            text
        });

        let end_offset = start_offset + FRAMING_LEN + data.len();
        self.source = rest;
        self.offset = end_offset;
        debug!("{chunk_type} chunk, {} data bytes, [{start_offset}, {end_offset})", data.len());

        Ok(ChunkRecord {
            chunk_type,
            data,
            crc: stored_crc,
            start_offset,
            end_offset,
            text,
            crc_mismatch,
        })
    }

    fn truncated(&self, field: ChunkField, needed: usize, available: usize) -> Error {
        StructuralError::TruncatedStream {
            offset: self.offset,
            field,
            needed,
            available,
        }
        .into()
    }
}

/// Splits `count` bytes off `input`, or reports how many bytes were left.
fn take_field(input: &[u8], count: usize) -> Result<(&[u8], &[u8]), usize> {
    take::<_, _, nom::error::Error<&[u8]>>(count)(input).map_err(|_| input.len())
}

impl<'a> Iterator for ChunkStream<'a> {
    type Item = Result<ChunkRecord<'a>, Error>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_chunk() {
            Ok(chunk) => {
                if chunk.chunk_type == ChunkType::IEND {
                    self.finished = true;
                }
                Some(Ok(chunk))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for ChunkStream<'_> {}
