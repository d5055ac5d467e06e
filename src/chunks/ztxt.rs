use nom::number::complete::u8 as method;

use super::{
    text::{keyword, latin1, null_terminated},
    ChunkType, TextChunk, TextDecoder, TextPayload,
};
use crate::error::PayloadError;

/// The only compression method PNG defines: zlib deflate.
pub(crate) const DEFLATE: u8 = 0;

pub(crate) struct ZTXtChunk;
impl TextChunk for ZTXtChunk {
    const CHUNK_TYPE: ChunkType = ChunkType::zTXt;

    fn decode(data: &[u8], decoder: &TextDecoder) -> Result<TextPayload, PayloadError> {
        let (rest, key) =
            null_terminated(data).map_err(|_| PayloadError::MissingKeyValueSeparator)?;
        let keyword = keyword(key)?;
        let (compressed, compression_method) =
            method(rest).map_err(|_: nom::Err<nom::error::Error<&[u8]>>| {
                PayloadError::MissingField("compression method")
            })?;
        if compression_method != DEFLATE {
            return Err(PayloadError::UnsupportedCompressionMethod(compression_method));
        }
        let text = decoder.inflate(compressed)?;
        Ok(TextPayload {
            kind: Self::CHUNK_TYPE,
            keyword,
            language_tag: None,
            translated_keyword: None,
            text: latin1(&text),
            compressed: true,
        })
    }
}
