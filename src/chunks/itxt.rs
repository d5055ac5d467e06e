use nom::{number::complete::u8, sequence::tuple};

use super::{
    text::{keyword, latin1, null_terminated},
    ztxt::DEFLATE,
    ChunkType, TextChunk, TextDecoder, TextPayload,
};
use crate::error::PayloadError;

pub(crate) struct ITXtChunk;
impl TextChunk for ITXtChunk {
    const CHUNK_TYPE: ChunkType = ChunkType::iTXt;

    fn decode(data: &[u8], decoder: &TextDecoder) -> Result<TextPayload, PayloadError> {
        let (rest, key) =
            null_terminated(data).map_err(|_| PayloadError::MissingKeyValueSeparator)?;
        let keyword = keyword(key)?;
        let (rest, (flag, method)) = tuple((u8, u8))(rest).map_err(
            |_: nom::Err<nom::error::Error<&[u8]>>| PayloadError::MissingField("compression flags"),
        )?;
        let (rest, language_tag) =
            null_terminated(rest).map_err(|_| PayloadError::MissingField("language tag"))?;
        let (text, translated_keyword) =
            null_terminated(rest).map_err(|_| PayloadError::MissingField("translated keyword"))?;

        let compressed = match flag {
            0 => false,
            1 => true,
            other => return Err(PayloadError::InvalidCompressionFlag(other)),
        };
        let text = if compressed {
            if method != DEFLATE {
                return Err(PayloadError::UnsupportedCompressionMethod(method));
            }
            decoder.inflate(text)?
        } else {
            text.to_vec()
        };

        Ok(TextPayload {
            kind: Self::CHUNK_TYPE,
            keyword,
            language_tag: Some(latin1(language_tag)),
            translated_keyword: Some(utf8(translated_keyword.to_vec(), "translated keyword")?),
            text: utf8(text, "text")?,
            compressed,
        })
    }
}

fn utf8(bytes: Vec<u8>, field: &'static str) -> Result<String, PayloadError> {
    String::from_utf8(bytes).map_err(|e| PayloadError::InvalidUtf8 {
        field,
        reason: e.utf8_error().to_string(),
    })
}
