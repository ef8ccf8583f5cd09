//! Error types for Vorbis header decoding.

use thiserror::Error;

/// Vorbis structural errors.
///
/// Each variant names the header field or table whose constraint was
/// violated.
#[derive(Error, Debug)]
pub enum VorbisError {
    /// The packet does not carry the expected type byte and signature.
    #[error("Packet is not a Vorbis {expected} header")]
    NotAHeader {
        /// The header kind that was expected.
        expected: &'static str,
    },

    /// The identification header's version field is not zero.
    #[error("Unsupported Vorbis version {0}")]
    BadVersion(u32),

    /// The identification header declares zero channels.
    #[error("Channel count must be nonzero")]
    BadChannelCount,

    /// The identification header declares a zero sample rate.
    #[error("Sample rate must be nonzero")]
    BadSampleRate,

    /// A block size is outside 64..=8192 or not a power of two.
    #[error("Invalid {name} of {value}")]
    BadBlockSize {
        /// Which block size field (`blocksize_0` or `blocksize_1`).
        name: &'static str,
        /// The decoded value.
        value: u32,
    },

    /// blocksize_0 exceeds blocksize_1.
    #[error("blocksize_0 {block0} exceeds blocksize_1 {block1}")]
    BlockSizeOrder {
        /// Decoded blocksize_0.
        block0: u32,
        /// Decoded blocksize_1.
        block1: u32,
    },

    /// A mandatory framing bit is unset.
    #[error("Framing bit unset at end of {0} header")]
    MissingFraming(&'static str),

    /// A codebook does not start with the sync pattern.
    #[error("Invalid codebook sync pattern {0:#08x}")]
    BadCodebookSync(u32),

    /// An ordered codebook assigns more codewords than it has entries.
    #[error("Ordered codebook run overflows its {entries} entries")]
    CodewordOverflow {
        /// Declared entry count.
        entries: u32,
    },

    /// A codebook lookup type other than 0, 1, or 2.
    #[error("Unsupported codebook lookup type {0}")]
    BadLookupType(u8),

    /// A time-domain placeholder with a nonzero type.
    #[error("Unsupported time type {0}")]
    BadTimeType(u16),

    /// A floor type other than 0 or 1.
    #[error("Unsupported floor type {0}")]
    BadFloorType(u16),

    /// A residue type other than 0, 1, or 2.
    #[error("Unsupported residue type {0}")]
    BadResidueType(u16),

    /// A mapping type other than 0.
    #[error("Unsupported mapping type {0}")]
    BadMappingType(u16),

    /// A mode window or transform type other than 0.
    #[error("Invalid mode {field} {value}")]
    BadModeField {
        /// Which mode field (`window type` or `transform type`).
        field: &'static str,
        /// The decoded value.
        value: u16,
    },

    /// A cross-reference into an earlier table is out of range.
    #[error("{table} index {index} out of range ({limit} available)")]
    IndexOutOfRange {
        /// Which table the index points into.
        table: &'static str,
        /// The out-of-range index.
        index: usize,
        /// Number of entries actually available.
        limit: usize,
    },

    /// Coupling step channels are equal or out of range.
    #[error("Invalid coupling channels: magnitude {magnitude}, angle {angle}")]
    BadCouplingChannels {
        /// Magnitude channel number.
        magnitude: u32,
        /// Angle channel number.
        angle: u32,
    },

    /// The reserved mapping field is nonzero.
    #[error("Reserved mapping bits must be zero")]
    BadMappingReserved,

    /// A floor 1 X list contains duplicate values.
    #[error("Non-unique values in floor1 X list")]
    NonUniqueFloorXList,

    /// A floor 1 X list exceeds 65 entries.
    #[error("Floor1 X list of {0} entries exceeds 65")]
    FloorXListTooLong(usize),

    /// The comment header is structurally malformed.
    #[error("Invalid comment header: {0}")]
    BadComment(String),

    /// The header data ended mid-field.
    #[error("{0}")]
    Read(#[from] remux_core::Error),
}

impl From<VorbisError> for remux_core::Error {
    fn from(err: VorbisError) -> Self {
        match err {
            VorbisError::Read(inner) => inner,
            other => remux_core::Error::Codec(remux_core::CodecError::Vorbis(other.to_string())),
        }
    }
}

/// Result type for Vorbis operations.
pub type Result<T> = std::result::Result<T, VorbisError>;
