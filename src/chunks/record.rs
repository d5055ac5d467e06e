use crate::{
    chunks::{ChunkType, TextPayload},
    crc,
    error::{CrcMismatch, PayloadError},
};

/// Size of the length, type and CRC fields surrounding a chunk's data.
pub(crate) const FRAMING_LEN: usize = 4 + 4 + 4;

/// One chunk as read off the stream. Offsets count from the first byte after the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord<'a> {
    pub(crate) chunk_type: ChunkType,
    pub(crate) data: &'a [u8],
    pub(crate) crc: u32,
    pub(crate) start_offset: usize,
    pub(crate) end_offset: usize,
    pub(crate) text: Option<Result<TextPayload, PayloadError>>,
    pub(crate) crc_mismatch: Option<CrcMismatch>,
}

impl<'a> ChunkRecord<'a> {
    pub fn chunk_type(&self) -> ChunkType {
        self.chunk_type
    }

    pub fn raw_data(&self) -> &'a [u8] {
        self.data
    }

    /// Value of the on-disk length field.
    pub fn data_length(&self) -> usize {
        self.data.len()
    }

    pub fn crc(&self) -> u32 {
        self.crc
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    /// Exclusive; equals the next record's `start_offset`.
    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    /// Total on-disk span recomputed from the data, which always equals
    /// `end_offset - start_offset`.
    pub fn length(&self) -> usize {
        FRAMING_LEN + self.data.len()
    }

    /// The decoded payload, for text chunks whose payload decoded cleanly.
    pub fn text(&self) -> Option<&TextPayload> {
        self.text.as_ref()?.as_ref().ok()
    }

    /// The payload rendered as a string, see [`TextPayload`]'s `Display`.
    pub fn decoded_text(&self) -> Option<String> {
        self.text().map(ToString::to_string)
    }

    pub fn text_error(&self) -> Option<&PayloadError> {
        self.text.as_ref()?.as_ref().err()
    }

    /// Set when the stream runs with [`CrcPolicy::Flag`](crate::CrcPolicy::Flag) and the stored
    /// CRC is wrong.
    pub fn crc_mismatch(&self) -> Option<&CrcMismatch> {
        self.crc_mismatch.as_ref()
    }

    /// Re-encodes the chunk with a freshly computed CRC.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.length());
        bytes.extend((self.data.len() as u32).to_be_bytes());
        bytes.extend(self.chunk_type.as_bytes());
        bytes.extend(self.data);
        bytes.extend(crc::chunk_crc(self.chunk_type.as_bytes(), self.data).to_be_bytes());
        bytes
    }
}
