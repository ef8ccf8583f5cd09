//! # Remux CAF
//!
//! Core Audio Format chunk encoding and decoding for the remux
//! library.
//!
//! CAF files are an 8-byte file header followed by typed, sized
//! chunks. This crate decodes and encodes the chunk types an Ogg-Opus
//! transcode produces and consumes (`desc`, `chan`, `data`, `pakt`),
//! carries everything else as generic chunks, and guarantees that
//! `decode` followed by `encode` reproduces the input bytes.

#![warn(missing_docs)]

pub mod chan;
pub mod chunk;
pub mod data;
pub mod desc;
pub mod error;
pub mod head;
pub mod pakt;
pub mod reader;

pub use chan::{ChannelDescription, ChannelLayout};
pub use chunk::{CafChunk, ChunkHeader, ChunkType, CHUNK_HEADER_SIZE};
pub use data::AudioData;
pub use desc::AudioDescription;
pub use error::{ChunkError, Result};
pub use head::{FileHeader, FILE_HEADER_SIZE, FILE_TYPE};
pub use pakt::{PacketTable, PAKT_HEADER_SIZE};
pub use reader::ChunkReader;
