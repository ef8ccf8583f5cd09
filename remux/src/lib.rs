//! # Remux
//!
//! A binary container and bitstream engine for audio formats: Ogg page
//! parsing and mutation, Vorbis and Opus header decoding, CAF chunk
//! coding, and streaming Ogg-Opus to CAF transcoding — all without
//! decoding a single audio sample.
//!
//! ## Quick start
//!
//! ```no_run
//! use remux::{MemorySource, OggOpusToCaf, PageReader};
//!
//! fn main() -> remux::Result<()> {
//!     let ogg_bytes = std::fs::read("input.opus")?;
//!     let reader = PageReader::new(MemorySource::new(ogg_bytes));
//!     let caf = OggOpusToCaf::new(reader).transcode()?;
//!     std::fs::write("output.caf", caf.into_bytes())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several crates:
//! - `remux-core`: errors, bit-level I/O, and the Ogg CRC engine
//! - `remux-ogg`: physical pages, structural mutation, streaming reads
//! - `remux-vorbis`: Vorbis identification/comment/setup headers
//! - `remux-opus`: Opus headers and packet structure
//! - `remux-caf`: Core Audio Format chunks
//!
//! This crate layers codec-aware demuxing and the transcoder on top
//! and re-exports the commonly used types.

#![warn(missing_docs)]

pub mod demux;
pub mod transcoder;

// Re-export core types
pub use remux_core::{
    bitstream::{BitReader, BitWriter},
    crc::crc32,
    error::{BitstreamError, ChunkError, CodecError, Error, PageError, Result},
};

// Re-export container types
pub use remux_ogg::{
    ByteSource, MemorySource, OggPage, PageBuilder, PageReader, ReaderState, SourceChunk,
};

// Re-export codec types
pub use remux_opus::{
    classify_packet as classify_opus_packet, parse_packet as parse_opus_packet, OpusHead,
    OpusPacket, OpusPacketKind, OpusTags, OpusToc,
};
pub use remux_vorbis::{
    classify_packet as classify_vorbis_packet, CommentHeader, IdentificationHeader, SetupHeader,
    VorbisPacketKind,
};

// Re-export CAF types
pub use remux_caf::{
    AudioData, AudioDescription, CafChunk, ChannelLayout, ChunkReader, ChunkType, FileHeader,
    PacketTable,
};

// High-level API
pub use demux::{OggOpusDemuxer, OggOpusEvent, OggVorbisDemuxer, OggVorbisEvent};
pub use transcoder::{CafStream, OggOpusToCaf, TranscodeStats};
