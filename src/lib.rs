//! Walks the chunk stream of a PNG file and decodes its `tEXt`, `zTXt` and `iTXt` metadata.
//!
//! ```no_run
//! use png_text::{ChunkStream, StreamOptions};
//!
//! let file = std::fs::read("image.png")?;
//! for chunk in ChunkStream::from_png(&file, StreamOptions::default())? {
//!     let chunk = chunk?;
//!     if let Some(text) = chunk.decoded_text() {
//!         println!("{}: {text}", chunk.chunk_type());
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod chunks;
pub mod crc;
mod decoder;
mod error;

pub use chunks::{ChunkRecord, ChunkType, TextDecoder, TextPayload};
pub use decoder::{
    split_signature, ChunkStream, CrcPolicy, StreamOptions, MAX_CHUNK_LENGTH, PNG_SIGNATURE,
};
pub use error::{ChunkField, ChunkTypeError, CrcMismatch, Error, PayloadError, StructuralError};
