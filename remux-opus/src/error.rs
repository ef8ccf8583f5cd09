//! Error types for Opus packet and header decoding.

use thiserror::Error;

/// Opus structural errors.
///
/// Each variant names the RFC 6716 constraint that the packet violated.
#[derive(Error, Debug)]
pub enum OpusError {
    /// The packet has no bytes at all.
    #[error("Empty packet has no TOC byte")]
    EmptyPacket,

    /// A code 1 packet's frame payload does not split evenly in two.
    #[error("Code 1 packet payload of {payload} bytes is not divisible into two equal frames")]
    UnevenCode1Payload {
        /// Bytes following the TOC byte.
        payload: usize,
    },

    /// A code 2 packet with no room for its first frame length.
    #[error("A 1-byte code 2 packet is invalid")]
    TruncatedCode2,

    /// A 2-byte code 2 packet whose second byte demands the 2-byte
    /// frame-length form.
    #[error("A 2-byte code 2 packet whose second byte is in 252..=255 is invalid")]
    InvalidShortCode2,

    /// A frame length field runs past the end of the packet.
    #[error("Frame length coding for frame {frame} runs past the packet end")]
    TruncatedFrameLength {
        /// Index of the frame whose length could not be read.
        frame: usize,
    },

    /// The first frame's coded length exceeds the packet payload.
    #[error("Coded frame length {length} exceeds the {available} bytes available")]
    FrameLengthOverrun {
        /// The coded length.
        length: usize,
        /// Bytes actually available for the frame.
        available: usize,
    },

    /// A code 3 packet shorter than its mandatory 2-byte header.
    #[error("Code 3 packets must have at least 2 bytes")]
    TruncatedCode3,

    /// A code 3 packet with a zero frame count.
    #[error("Code 3 packets must contain at least one frame")]
    ZeroFrameCount,

    /// A code 3 packet with more than 48 frames.
    #[error("Frame count {0} exceeds the code 3 maximum of 48")]
    ExcessiveFrameCount(u8),

    /// The padding length field runs past the end of the packet.
    #[error("Padding length field runs past the packet end")]
    TruncatedPadding,

    /// CBR payload bytes do not divide evenly among the frames.
    #[error("CBR payload of {payload} bytes is not a multiple of {frames} frames")]
    UnevenCbrPayload {
        /// Payload bytes after header and padding.
        payload: usize,
        /// Declared frame count.
        frames: usize,
    },

    /// The identification header is malformed.
    #[error("Invalid OpusHead header: {0}")]
    InvalidIdentification(String),

    /// The tags header is malformed.
    #[error("Invalid OpusTags header: {0}")]
    InvalidTags(String),
}

impl From<OpusError> for remux_core::Error {
    fn from(err: OpusError) -> Self {
        remux_core::Error::Codec(remux_core::CodecError::Opus(err.to_string()))
    }
}

/// Result type for Opus operations.
pub type Result<T> = std::result::Result<T, OpusError>;
