//! Vorbis identification and comment headers.

use remux_core::BitReader;

use crate::error::{Result, VorbisError};
use crate::{check_header_prefix, COMMENT_TYPE, IDENTIFICATION_TYPE};

/// The Vorbis identification header (packet type 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentificationHeader {
    /// Vorbis version; must be 0.
    pub version: u32,
    /// Number of audio channels.
    pub audio_channels: u8,
    /// Audio sample rate in Hz.
    pub audio_sample_rate: u32,
    /// Maximum bitrate hint, or 0/negative if unset.
    pub bitrate_maximum: i32,
    /// Nominal bitrate hint.
    pub bitrate_nominal: i32,
    /// Minimum bitrate hint.
    pub bitrate_minimum: i32,
    /// Short block size in samples; a power of two in 64..=8192.
    pub blocksize_0: u32,
    /// Long block size in samples; at least `blocksize_0`.
    pub blocksize_1: u32,
}

impl IdentificationHeader {
    /// Decode an identification header packet.
    pub fn parse(packet: &[u8]) -> Result<Self> {
        check_header_prefix(packet, IDENTIFICATION_TYPE, "identification")?;
        let mut reader = BitReader::at_byte(packet, 7);

        let version = reader.read_u32()?;
        if version != 0 {
            return Err(VorbisError::BadVersion(version));
        }

        let audio_channels = reader.read_u8()?;
        if audio_channels == 0 {
            return Err(VorbisError::BadChannelCount);
        }

        let audio_sample_rate = reader.read_u32()?;
        if audio_sample_rate == 0 {
            return Err(VorbisError::BadSampleRate);
        }

        let bitrate_maximum = reader.read_i32()?;
        let bitrate_nominal = reader.read_i32()?;
        let bitrate_minimum = reader.read_i32()?;

        let blocksize_0 = 1u32 << reader.read_bits(4)?;
        let blocksize_1 = 1u32 << reader.read_bits(4)?;
        check_blocksize("blocksize_0", blocksize_0)?;
        check_blocksize("blocksize_1", blocksize_1)?;
        if blocksize_0 > blocksize_1 {
            return Err(VorbisError::BlockSizeOrder {
                block0: blocksize_0,
                block1: blocksize_1,
            });
        }

        if !reader.read_bool()? {
            return Err(VorbisError::MissingFraming("identification"));
        }

        Ok(Self {
            version,
            audio_channels,
            audio_sample_rate,
            bitrate_maximum,
            bitrate_nominal,
            bitrate_minimum,
            blocksize_0,
            blocksize_1,
        })
    }
}

fn check_blocksize(name: &'static str, value: u32) -> Result<()> {
    if (64..=8192).contains(&value) && value.is_power_of_two() {
        Ok(())
    } else {
        Err(VorbisError::BadBlockSize { name, value })
    }
}

/// The Vorbis comment header (packet type 3).
///
/// Comments form an ordered multimap: field names are case-normalized
/// to uppercase, fields keep their first-seen order, and values within
/// a field keep stream order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentHeader {
    /// Vendor string of the encoding software.
    pub vendor: String,
    entries: Vec<(String, Vec<String>)>,
}

impl CommentHeader {
    /// Decode a comment header packet.
    pub fn parse(packet: &[u8]) -> Result<Self> {
        check_header_prefix(packet, COMMENT_TYPE, "comment")?;
        let mut reader = BitReader::at_byte(packet, 7);

        let vendor = read_string(&mut reader)?;

        let count = reader.read_u32()?;
        let mut header = CommentHeader {
            vendor,
            entries: Vec::new(),
        };

        for _ in 0..count {
            let comment = read_string(&mut reader)?;
            let (name, value) = match comment.split_once('=') {
                Some((name, value)) => (name.to_ascii_uppercase(), value.to_string()),
                None => {
                    return Err(VorbisError::BadComment(format!(
                        "comment {comment:?} has no '=' separator"
                    )))
                }
            };
            header.push(name, value);
        }

        if !reader.read_bool()? {
            return Err(VorbisError::MissingFraming("comment"));
        }

        Ok(header)
    }

    fn push(&mut self, name: String, value: String) {
        if let Some((_, values)) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            values.push(value);
        } else {
            self.entries.push((name, vec![value]));
        }
    }

    /// Values of a field, looked up case-insensitively.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        let name = name.to_ascii_uppercase();
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Iterate over fields in first-seen order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Total number of comment values.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }

    /// Whether the header carries no comments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read a 32-bit length-prefixed UTF-8 string.
fn read_string(reader: &mut BitReader<'_>) -> Result<String> {
    let len = reader.read_u32()?;
    let mut bytes = Vec::with_capacity(len.min(4096) as usize);
    for _ in 0..len {
        bytes.push(reader.read_u8()?);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
