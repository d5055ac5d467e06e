use std::fmt;

use thiserror::Error;

use crate::chunks::ChunkType;

/// The four on-disk fields of a chunk, in stream order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkField {
    Length,
    Type,
    Data,
    Crc,
}

impl fmt::Display for ChunkField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChunkField::Length => "length",
            ChunkField::Type => "type",
            ChunkField::Data => "data",
            ChunkField::Crc => "crc",
        })
    }
}

/// Why a 4-byte tag could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkTypeError {
    #[error("chunk tag {0:02x?} is not printable ASCII")]
    InvalidTagEncoding([u8; 4]),
    #[error("unknown {0:?} chunk type")]
    UnknownChunkType(String),
}

/// Failures of the chunk framing itself. The stream cannot resynchronise after one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("stream truncated at offset {offset}: chunk {field} needs {needed} bytes, {available} available")]
    TruncatedStream {
        offset: usize,
        field: ChunkField,
        needed: usize,
        available: usize,
    },
    #[error("chunk at offset {offset}: tag {tag:02x?} is not printable ASCII")]
    InvalidTagEncoding { offset: usize, tag: [u8; 4] },
    #[error("chunk at offset {offset}: unknown {tag:?} chunk type")]
    UnknownChunkType { offset: usize, tag: String },
    #[error("chunk at offset {offset}: declared length {length} exceeds 2^31-1")]
    InvalidLength { offset: usize, length: u32 },
    #[error("stream ended at offset {offset} without an IEND chunk")]
    MissingEndMarker { offset: usize },
    #[error("chunk at offset {offset}: first chunk is {found}, expected IHDR")]
    MissingHeader { offset: usize, found: ChunkType },
}

impl StructuralError {
    pub(crate) fn from_tag(error: ChunkTypeError, offset: usize) -> Self {
        match error {
            ChunkTypeError::InvalidTagEncoding(tag) => Self::InvalidTagEncoding { offset, tag },
            ChunkTypeError::UnknownChunkType(tag) => Self::UnknownChunkType { offset, tag },
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            Self::TruncatedStream { offset, .. }
            | Self::InvalidTagEncoding { offset, .. }
            | Self::UnknownChunkType { offset, .. }
            | Self::InvalidLength { offset, .. }
            | Self::MissingHeader { offset, .. }
            | Self::MissingEndMarker { offset } => *offset,
        }
    }
}

/// A chunk whose stored CRC disagrees with the one computed over its type and data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{chunk_type} chunk at offset {offset}: CRC mismatch (stored {expected:#010x}, computed {actual:#010x})")]
pub struct CrcMismatch {
    pub offset: usize,
    pub chunk_type: ChunkType,
    pub expected: u32,
    pub actual: u32,
}

/// Failures decoding the payload of a single text chunk.
///
/// These never stop the stream; they are attached to the [`ChunkRecord`](crate::ChunkRecord)
/// whose text could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("{0} chunks do not carry text")]
    NotTextChunk(ChunkType),
    #[error("no null separator after the keyword")]
    MissingKeyValueSeparator,
    #[error("keyword is {len} bytes, must be 1 to 79")]
    InvalidKeywordLength { len: usize },
    #[error("keyword {0:?} has leading or trailing spaces")]
    KeywordSpacing(String),
    #[error("text value contains a null byte at position {0}")]
    EmbeddedNull(usize),
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("unsupported compression method {0}")]
    UnsupportedCompressionMethod(u8),
    #[error("invalid compression flag {0}")]
    InvalidCompressionFlag(u8),
    #[error("failed to decompress text: {0}")]
    DecompressionError(String),
    #[error("{field} is not valid UTF-8: {reason}")]
    InvalidUtf8 { field: &'static str, reason: String },
}

/// Anything that stops or flags a walk over a PNG chunk stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("input doesn't start with the PNG signature")]
    InvalidSignature,
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Integrity(#[from] CrcMismatch),
}

impl Error {
    /// Structural failures (including a missing signature) leave the stream unusable.
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::InvalidSignature | Error::Structural(_))
    }

    /// Offset of the offending chunk, counted from the end of the signature.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::InvalidSignature => None,
            Error::Structural(e) => Some(e.offset()),
            Error::Integrity(e) => Some(e.offset),
        }
    }
}
