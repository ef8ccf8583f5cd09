//! The `chan` channel layout chunk.

use byteorder::{BigEndian, ByteOrder};
use remux_core::error::ChunkError;

use crate::error::Result;

/// Size of one encoded channel description.
const DESCRIPTION_SIZE: usize = 20;

/// One channel's label, flags, and spatial coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescription {
    /// Channel label identifying the speaker position.
    pub channel_label: u32,
    /// Interpretation flags for the coordinates.
    pub channel_flags: u32,
    /// Speaker coordinates.
    pub coordinates: [f32; 3],
}

/// The channel layout of the audio stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelLayout {
    /// Layout tag describing a standard arrangement, or 0.
    pub channel_layout_tag: u32,
    /// Bitmap of channel positions when the tag says so.
    pub channel_bitmap: u32,
    /// Explicit per-channel descriptions.
    pub descriptions: Vec<ChannelDescription>,
}

impl ChannelLayout {
    /// A layout identified by tag only, with no explicit descriptions.
    pub fn from_tag(channel_layout_tag: u32) -> Self {
        Self {
            channel_layout_tag,
            channel_bitmap: 0,
            descriptions: Vec::new(),
        }
    }

    /// Decode a `chan` chunk body.
    pub fn decode_body(body: &[u8]) -> Result<Self> {
        if body.len() < 12 {
            return Err(ChunkError::InvalidBody {
                chunk: "chan",
                message: format!("body must be at least 12 bytes, got {}", body.len()),
            });
        }

        let channel_layout_tag = BigEndian::read_u32(&body[0..4]);
        let channel_bitmap = BigEndian::read_u32(&body[4..8]);
        let count = BigEndian::read_u32(&body[8..12]) as usize;

        let expected = 12 + count * DESCRIPTION_SIZE;
        if body.len() != expected {
            return Err(ChunkError::InvalidBody {
                chunk: "chan",
                message: format!(
                    "{count} descriptions need {expected} bytes, got {}",
                    body.len()
                ),
            });
        }

        let mut descriptions = Vec::with_capacity(count);
        for i in 0..count {
            let at = 12 + i * DESCRIPTION_SIZE;
            descriptions.push(ChannelDescription {
                channel_label: BigEndian::read_u32(&body[at..at + 4]),
                channel_flags: BigEndian::read_u32(&body[at + 4..at + 8]),
                coordinates: [
                    BigEndian::read_f32(&body[at + 8..at + 12]),
                    BigEndian::read_f32(&body[at + 12..at + 16]),
                    BigEndian::read_f32(&body[at + 16..at + 20]),
                ],
            });
        }

        Ok(Self {
            channel_layout_tag,
            channel_bitmap,
            descriptions,
        })
    }

    /// Encode the chunk body.
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = vec![0u8; 12 + self.descriptions.len() * DESCRIPTION_SIZE];
        BigEndian::write_u32(&mut body[0..4], self.channel_layout_tag);
        BigEndian::write_u32(&mut body[4..8], self.channel_bitmap);
        BigEndian::write_u32(&mut body[8..12], self.descriptions.len() as u32);

        for (i, description) in self.descriptions.iter().enumerate() {
            let at = 12 + i * DESCRIPTION_SIZE;
            BigEndian::write_u32(&mut body[at..at + 4], description.channel_label);
            BigEndian::write_u32(&mut body[at + 4..at + 8], description.channel_flags);
            for (j, &coordinate) in description.coordinates.iter().enumerate() {
                BigEndian::write_f32(&mut body[at + 8 + j * 4..at + 12 + j * 4], coordinate);
            }
        }

        body
    }
}
