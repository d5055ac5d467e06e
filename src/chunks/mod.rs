use std::{fmt, str::FromStr};

use crate::error::{ChunkTypeError, PayloadError};

pub(crate) mod itxt;
pub(crate) mod record;
pub(crate) mod text;
pub(crate) mod ztxt;

pub use record::ChunkRecord;
pub use text::{TextDecoder, TextPayload};

/// Every chunk kind this crate recognises. Tags outside this set are rejected.
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    IHDR,
    PLTE,
    IDAT,
    IEND,
    bKGD,
    cHRM,
    dSIG,
    eXIf,
    gAMA,
    hIST,
    iCCP,
    iDOT,
    iTXt,
    pHYs,
    sBIT,
    sPLT,
    sRGB,
    sTER,
    tEXt,
    tIME,
    tRNS,
    zTXt,
}

impl ChunkType {
    pub const ALL: [ChunkType; 22] = [
        Self::IHDR,
        Self::PLTE,
        Self::IDAT,
        Self::IEND,
        Self::bKGD,
        Self::cHRM,
        Self::dSIG,
        Self::eXIf,
        Self::gAMA,
        Self::hIST,
        Self::iCCP,
        Self::iDOT,
        Self::iTXt,
        Self::pHYs,
        Self::sBIT,
        Self::sPLT,
        Self::sRGB,
        Self::sTER,
        Self::tEXt,
        Self::tIME,
        Self::tRNS,
        Self::zTXt,
    ];

    pub const fn as_bytes(&self) -> &'static [u8; 4] {
        match self {
            Self::IHDR => b"IHDR",
            Self::PLTE => b"PLTE",
            Self::IDAT => b"IDAT",
            Self::IEND => b"IEND",
            Self::bKGD => b"bKGD",
            Self::cHRM => b"cHRM",
            Self::dSIG => b"dSIG",
            Self::eXIf => b"eXIf",
            Self::gAMA => b"gAMA",
            Self::hIST => b"hIST",
            Self::iCCP => b"iCCP",
            Self::iDOT => b"iDOT",
            Self::iTXt => b"iTXt",
            Self::pHYs => b"pHYs",
            Self::sBIT => b"sBIT",
            Self::sPLT => b"sPLT",
            Self::sRGB => b"sRGB",
            Self::sTER => b"sTER",
            Self::tEXt => b"tEXt",
            Self::tIME => b"tIME",
            Self::tRNS => b"tRNS",
            Self::zTXt => b"zTXt",
        }
    }

    pub fn as_str(&self) -> &'static str {
        // Every tag is ASCII.
        std::str::from_utf8(self.as_bytes()).unwrap_or("????")
    }

    /// Maps a raw tag onto a known chunk kind.
    pub fn classify(tag: &[u8; 4]) -> Result<Self, ChunkTypeError> {
        if !tag.iter().all(|b| (0x20..=0x7e).contains(b)) {
            return Err(ChunkTypeError::InvalidTagEncoding(*tag));
        }
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_bytes() == tag)
            .ok_or_else(|| ChunkTypeError::UnknownChunkType(tag.iter().map(|&b| b as char).collect()))
    }

    pub fn is_text_bearing(&self) -> bool {
        matches!(self, Self::tEXt | Self::zTXt | Self::iTXt)
    }

    /// Critical chunks have an uppercase first letter.
    pub fn is_critical(&self) -> bool {
        self.as_bytes()[0].is_ascii_uppercase()
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<[u8; 4]> for ChunkType {
    type Error = ChunkTypeError;
    fn try_from(value: [u8; 4]) -> Result<Self, Self::Error> {
        Self::classify(&value)
    }
}

impl FromStr for ChunkType {
    type Err = ChunkTypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| ChunkTypeError::UnknownChunkType(s.to_owned()))?;
        Self::classify(&tag)
    }
}

/// A chunk whose payload is human readable text.
pub(crate) trait TextChunk {
    const CHUNK_TYPE: ChunkType;

    fn decode(data: &[u8], decoder: &TextDecoder) -> Result<TextPayload, PayloadError>;
}
