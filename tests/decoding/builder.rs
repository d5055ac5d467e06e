use miniz_oxide::deflate::compress_to_vec_zlib;
use png_text::{crc::chunk_crc, PNG_SIGNATURE};

/// Assembles chunk streams chunk by chunk, with correct CRCs unless told otherwise.
#[derive(Default)]
pub struct PngBuilder {
    bytes: Vec<u8>,
}

impl PngBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk(self, chunk_type: &[u8; 4], data: &[u8]) -> Self {
        let crc = chunk_crc(chunk_type, data);
        self.raw_chunk(chunk_type, data, crc)
    }

    pub fn raw_chunk(mut self, chunk_type: &[u8; 4], data: &[u8], crc: u32) -> Self {
        self.bytes.extend((data.len() as u32).to_be_bytes());
        self.bytes.extend(chunk_type);
        self.bytes.extend(data);
        self.bytes.extend(crc.to_be_bytes());
        self
    }

    pub fn ihdr(self) -> Self {
        let mut data = vec![];
        data.extend(1u32.to_be_bytes());
        data.extend(1u32.to_be_bytes());
        data.extend([8, 6, 0, 0, 0]);
        self.chunk(b"IHDR", &data)
    }

    pub fn idat(self) -> Self {
        let data = compress_to_vec_zlib(&[0, 0xff, 0x00, 0x00, 0xff], 6);
        self.chunk(b"IDAT", &data)
    }

    pub fn text(self, keyword: &str, value: &[u8]) -> Self {
        let mut data = keyword.as_bytes().to_vec();
        data.push(0);
        data.extend(value);
        self.chunk(b"tEXt", &data)
    }

    pub fn ztxt(self, keyword: &str, value: &[u8]) -> Self {
        self.ztxt_raw(keyword, &compress_to_vec_zlib(value, 6))
    }

    pub fn ztxt_raw(self, keyword: &str, compressed: &[u8]) -> Self {
        let mut data = keyword.as_bytes().to_vec();
        data.extend([0, 0]);
        data.extend(compressed);
        self.chunk(b"zTXt", &data)
    }

    pub fn itxt(self, keyword: &str, language: &str, translated: &str, text: &str) -> Self {
        let mut data = keyword.as_bytes().to_vec();
        data.extend([0, 1, 0]);
        data.extend(language.as_bytes());
        data.push(0);
        data.extend(translated.as_bytes());
        data.push(0);
        data.extend(compress_to_vec_zlib(text.as_bytes(), 6));
        self.chunk(b"iTXt", &data)
    }

    pub fn iend(self) -> Self {
        self.chunk(b"IEND", &[])
    }

    /// The chunk stream alone, as it follows the signature.
    pub fn stream(self) -> Vec<u8> {
        self.bytes
    }

    /// A whole file, signature included.
    pub fn file(self) -> Vec<u8> {
        let mut file = PNG_SIGNATURE.to_vec();
        file.extend(self.bytes);
        file
    }
}
