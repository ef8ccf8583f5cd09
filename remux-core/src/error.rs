//! Error types for the remux library.
//!
//! This module provides the error hierarchy shared by all remux crates.
//! Codec crates define their own structural error enums and convert into
//! [`Error`] at the boundary.

use thiserror::Error;

/// Main error type for the remux library.
#[derive(Error, Debug)]
pub enum Error {
    /// Ogg page errors (parsing, validation, mutation).
    #[error("Page error: {0}")]
    Page(#[from] PageError),

    /// CAF chunk errors (decoding/encoding).
    #[error("Chunk error: {0}")]
    Chunk(#[from] ChunkError),

    /// Bit-level parsing errors.
    #[error("Bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),

    /// Codec-level structural errors (Vorbis/Opus headers and packets).
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// I/O errors from the byte source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid parameter provided by the caller.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The byte source is exhausted.
    #[error("End of stream")]
    EndOfStream,
}

/// Ogg physical page errors.
#[derive(Error, Debug)]
pub enum PageError {
    /// The buffer does not yet hold a complete page. This is a wait
    /// signal, not a failure: the caller should supply more bytes.
    #[error("Incomplete page data: need {needed} bytes, have {available}")]
    IncompleteData {
        /// Minimum number of bytes required to make progress.
        needed: usize,
        /// Number of bytes currently available.
        available: usize,
    },

    /// The capture pattern is not `OggS`.
    #[error("Invalid Ogg capture pattern")]
    MagicSignature,

    /// The segment table is structurally invalid.
    #[error("Invalid segment table: {0}")]
    SegmentTable(String),

    /// The stored page checksum does not match the computed one.
    #[error("Page checksum mismatch: stored {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum stored in the page header.
        expected: u32,
        /// Checksum computed over the page bytes.
        actual: u32,
    },

    /// A logical segment index is out of range.
    #[error("Segment index {index} out of range ({count} segments)")]
    SegmentIndex {
        /// The requested index.
        index: usize,
        /// Number of logical segments in the page.
        count: usize,
    },

    /// A removal range does not select any segment.
    #[error("Segment removal count must be nonzero")]
    EmptyRange,

    /// A removal range extends past the last segment.
    #[error("Removal range {index}..{} exceeds segment count {count}", .index + .len)]
    RemoveRange {
        /// First segment to remove.
        index: usize,
        /// Number of segments to remove.
        len: usize,
        /// Number of logical segments in the page.
        count: usize,
    },

    /// A replacement segment exceeds the 255-byte limit.
    #[error("Replacement segment of {len} bytes exceeds 255")]
    SegmentTooLarge {
        /// Length of the offending segment.
        len: usize,
    },

    /// Re-encoding the lacing values would overflow the 255-entry table.
    #[error("Lacing table would need {needed} entries, limit is 255")]
    LacingOverflow {
        /// Number of lacing entries required.
        needed: usize,
    },
}

impl PageError {
    /// Check whether this error only means "wait for more bytes".
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, PageError::IncompleteData { .. })
    }
}

/// CAF chunk errors.
#[derive(Error, Debug)]
pub enum ChunkError {
    /// The buffer ends before the declared chunk body does.
    #[error("Truncated chunk body: declared {declared} bytes, have {available}")]
    Truncated {
        /// Declared body size.
        declared: u64,
        /// Bytes actually available.
        available: usize,
    },

    /// A chunk body does not match its fixed layout.
    #[error("Invalid {chunk} chunk body: {message}")]
    InvalidBody {
        /// Four-character chunk type.
        chunk: &'static str,
        /// What went wrong.
        message: String,
    },

    /// A chunk declares a negative body size.
    #[error("Negative chunk size {0}")]
    NegativeSize(i64),

    /// The file header magic is not `caff`.
    #[error("Invalid CAF file type tag")]
    FileType,
}

/// Bit-level parsing errors.
#[derive(Error, Debug)]
pub enum BitstreamError {
    /// A read would run past the end of the buffer.
    #[error("Unexpected end of bitstream")]
    UnexpectedEnd,

    /// A multi-bit read was requested with an unsupported width.
    #[error("Cannot read {0} bits at once (limit 32)")]
    InvalidBitCount(u8),
}

/// Codec-level structural errors.
///
/// The Vorbis and Opus crates keep their own typed enums; this is the
/// shape they take when crossing into the shared [`Error`].
#[derive(Error, Debug)]
pub enum CodecError {
    /// Vorbis header violated a structural constraint.
    #[error("Vorbis: {0}")]
    Vorbis(String),

    /// Opus packet or header violated a structural constraint.
    #[error("Opus: {0}")]
    Opus(String),
}

/// Result type alias using the remux [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    /// Check whether this error is a "wait for more bytes" signal.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Error::Page(e) if e.is_incomplete())
    }

    /// Check whether tolerant-mode resynchronization may recover from
    /// this error by skipping input bytes.
    #[must_use]
    pub fn is_resyncable(&self) -> bool {
        matches!(
            self,
            Error::Page(
                PageError::MagicSignature
                    | PageError::ChecksumMismatch { .. }
                    | PageError::SegmentTable(..)
            )
        )
    }
}
