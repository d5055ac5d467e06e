use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use png_text::{ChunkRecord, ChunkStream, CrcPolicy, StreamOptions, PNG_SIGNATURE};

/// Prints the text chunks of a PNG image.
#[derive(Debug, Parser)]
struct Args {
    /// A PNG image.
    file: PathBuf,

    /// Require the first chunk to be IHDR.
    #[clap(long)]
    strict: bool,

    /// What to do with chunks whose CRC doesn't match their contents.
    #[clap(long, value_enum, default_value_t = Crc::Flag)]
    crc: Crc,

    /// Print the text chunks as a JSON array.
    #[clap(long)]
    json: bool,

    /// Log more. Pass twice for per-chunk output.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Crc {
    Ignore,
    Flag,
    Fatal,
}

impl From<Crc> for CrcPolicy {
    fn from(value: Crc) -> Self {
        match value {
            Crc::Ignore => CrcPolicy::Ignore,
            Crc::Flag => CrcPolicy::Flag,
            Crc::Fatal => CrcPolicy::Fatal,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let verbosity = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    pretty_env_logger::formatted_builder()
        .filter_level(verbosity)
        .init();

    anyhow::ensure!(args.file.is_file(), "{:?} file not found!", args.file);
    let input = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {:?}", args.file))?;
    let options = StreamOptions::default()
        .crc_policy(args.crc.into())
        .require_header(args.strict);
    let mut stream = ChunkStream::from_png(&input, options)
        .with_context(|| format!("{:?} file is not a PNG image!", args.file))?;

    let mut text_chunks = vec![];
    for chunk in stream.by_ref() {
        let offset = error_offset(&chunk);
        let chunk = chunk.with_context(|| match offset {
            Some(offset) => format!("Failed to walk {:?} at offset {offset:08}", args.file),
            None => format!("Failed to walk {:?}", args.file),
        })?;
        if chunk.chunk_type().is_text_bearing() {
            text_chunks.push(chunk);
        }
    }
    log::info!(
        "walked {} bytes of chunks, {} with text",
        stream.offset(),
        text_chunks.len()
    );

    if args.json {
        println!("{}", serde_json::Value::from_iter(text_chunks.iter().map(to_json)));
    } else {
        for chunk in &text_chunks {
            println!("{}\n", render(chunk));
        }
    }
    Ok(())
}

/// File offset of the chunk a stream error points at.
fn error_offset<T>(result: &Result<T, png_text::Error>) -> Option<usize> {
    let offset = result.as_ref().err()?.offset()?;
    Some(offset + PNG_SIGNATURE.len())
}

/// Offsets are printed relative to the start of the file, not the chunk stream.
fn file_offsets(chunk: &ChunkRecord) -> (usize, usize) {
    (
        chunk.start_offset() + PNG_SIGNATURE.len(),
        chunk.end_offset() + PNG_SIGNATURE.len(),
    )
}

fn render(chunk: &ChunkRecord) -> String {
    let (start, end) = file_offsets(chunk);
    let body = match (chunk.decoded_text(), chunk.text_error()) {
        (Some(text), _) => text,
        (None, Some(e)) => format!("<undecodable: {e}>"),
        (None, None) => String::new(),
    };
    let mut header = format!("[{start:08}-{end:08}] {}", chunk.chunk_type());
    if let Some(mismatch) = chunk.crc_mismatch() {
        header += &format!(
            " (CRC mismatch: stored {:#010x}, computed {:#010x})",
            mismatch.expected, mismatch.actual
        );
    }
    format!("{header}:\n{body}")
}

fn to_json(chunk: &ChunkRecord) -> serde_json::Value {
    let (start, end) = file_offsets(chunk);
    serde_json::json!({
        "start": start,
        "end": end,
        "type": chunk.chunk_type().as_str(),
        "keyword": chunk.text().map(|t| t.keyword.as_str()),
        "text": chunk.text().map(|t| t.text.as_str()),
        "error": chunk.text_error().map(ToString::to_string),
        "crc_mismatch": chunk.crc_mismatch().is_some(),
    })
}
