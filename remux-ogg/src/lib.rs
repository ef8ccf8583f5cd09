//! Ogg physical page support for the remux library.
//!
//! This crate implements the Ogg logical-page format from RFC 3533:
//! parsing and validating single pages (capture pattern, header fields,
//! segment table, lacing into logical packet boundaries), structural
//! mutation of pages with checksum recomputation, and an incremental
//! page reader that assembles pages from a pull-based byte source that
//! delivers chunks of arbitrary size.
//!
//! Pages are immutable values. Every mutation returns a new page with a
//! freshly computed checksum; the original is left untouched.

#![warn(missing_docs)]

mod edit;
mod page;
mod reader;

pub use page::{OggPage, PageBuilder, CAPTURE_PATTERN, MAX_SEGMENTS, MIN_HEADER_SIZE};
pub use reader::{ByteSource, MemorySource, PageReader, ReaderState, SourceChunk};
