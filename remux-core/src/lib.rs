//! # Remux Core
//!
//! Core types and utilities for the remux container library.
//!
//! This crate provides the building blocks shared by the format crates:
//! - Error handling types
//! - Bit-level reading/writing in the Vorbis packing convention
//! - The Ogg CRC-32 engine

#![warn(missing_docs)]

pub mod bitstream;
pub mod crc;
pub mod error;

pub use bitstream::{ilog, BitReader, BitWriter};
pub use crc::crc32;
pub use error::{BitstreamError, ChunkError, CodecError, Error, PageError, Result};
