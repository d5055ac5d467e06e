use std::fmt;

use log::trace;
use miniz_oxide::inflate::decompress_to_vec_zlib_with_limit;
use nom::{
    bytes::complete::{tag, take_till},
    sequence::terminated,
    IResult,
};

use super::{itxt::ITXtChunk, ztxt::ZTXtChunk, ChunkType, TextChunk};
use crate::error::PayloadError;

/// Decoded contents of a `tEXt`, `zTXt` or `iTXt` chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPayload {
    pub kind: ChunkType,
    pub keyword: String,
    /// `iTXt` only, may be empty.
    pub language_tag: Option<String>,
    /// `iTXt` only, may be empty.
    pub translated_keyword: Option<String>,
    pub text: String,
    pub compressed: bool,
}

impl fmt::Display for TextPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.keyword, self.text)
    }
}

/// Turns the raw data of a text chunk into a [`TextPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextDecoder {
    /// Upper bound on the size of inflated `zTXt`/`iTXt` text.
    pub max_text_len: usize,
}

impl Default for TextDecoder {
    fn default() -> Self {
        Self {
            max_text_len: 8 * 1024 * 1024,
        }
    }
}

impl TextDecoder {
    pub fn new(max_text_len: usize) -> Self {
        Self { max_text_len }
    }

    pub fn decode(&self, chunk_type: ChunkType, data: &[u8]) -> Result<TextPayload, PayloadError> {
        trace!("decoding {} bytes of {chunk_type} text", data.len());
        match chunk_type {
            ChunkType::tEXt => TEXtChunk::decode(data, self),
            ChunkType::zTXt => ZTXtChunk::decode(data, self),
            ChunkType::iTXt => ITXtChunk::decode(data, self),
            other => Err(PayloadError::NotTextChunk(other)),
        }
    }

    pub(crate) fn inflate(&self, compressed: &[u8]) -> Result<Vec<u8>, PayloadError> {
        decompress_to_vec_zlib_with_limit(compressed, self.max_text_len)
            .map_err(|e| PayloadError::DecompressionError(e.to_string()))
    }
}

pub(crate) struct TEXtChunk;
impl TextChunk for TEXtChunk {
    const CHUNK_TYPE: ChunkType = ChunkType::tEXt;

    fn decode(data: &[u8], _decoder: &TextDecoder) -> Result<TextPayload, PayloadError> {
        let (value, key) =
            null_terminated(data).map_err(|_| PayloadError::MissingKeyValueSeparator)?;
        let keyword = keyword(key)?;
        if let Some(pos) = value.iter().position(|&b| b == 0) {
            return Err(PayloadError::EmbeddedNull(pos));
        }
        Ok(TextPayload {
            kind: Self::CHUNK_TYPE,
            keyword,
            language_tag: None,
            translated_keyword: None,
            text: latin1(value),
            compressed: false,
        })
    }
}

pub(crate) fn null_terminated(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(take_till(|b| b == 0), tag(b"\0"))(input)
}

pub(crate) fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Keywords are 1-79 Latin-1 bytes without leading or trailing spaces.
pub(crate) fn keyword(bytes: &[u8]) -> Result<String, PayloadError> {
    if !(1..=79).contains(&bytes.len()) {
        return Err(PayloadError::InvalidKeywordLength { len: bytes.len() });
    }
    let keyword = latin1(bytes);
    if keyword.starts_with(' ') || keyword.ends_with(' ') {
        return Err(PayloadError::KeywordSpacing(keyword));
    }
    Ok(keyword)
}
