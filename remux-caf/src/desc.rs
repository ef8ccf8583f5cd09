//! The `desc` audio description chunk.

use byteorder::{BigEndian, ByteOrder};
use remux_core::error::ChunkError;

use crate::error::Result;

/// Size of the fixed `desc` chunk body.
pub const DESC_BODY_SIZE: usize = 32;

/// The audio stream description: a fixed 32-byte big-endian layout.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioDescription {
    /// Sample rate in frames per second.
    pub sample_rate: f64,
    /// Four-character format identifier (for example `opus` or `aac `).
    pub format_id: [u8; 4],
    /// Format-specific flags.
    pub format_flags: u32,
    /// Bytes per packet, or 0 if variable.
    pub bytes_per_packet: u32,
    /// Frames per packet, or 0 if variable.
    pub frames_per_packet: u32,
    /// Channels per frame.
    pub channels_per_frame: u32,
    /// Bits per channel, or 0 for compressed formats.
    pub bits_per_channel: u32,
}

impl AudioDescription {
    /// Decode a `desc` chunk body.
    pub fn decode_body(body: &[u8]) -> Result<Self> {
        if body.len() != DESC_BODY_SIZE {
            return Err(ChunkError::InvalidBody {
                chunk: "desc",
                message: format!("body must be {DESC_BODY_SIZE} bytes, got {}", body.len()),
            });
        }

        let mut format_id = [0u8; 4];
        format_id.copy_from_slice(&body[8..12]);

        Ok(Self {
            sample_rate: BigEndian::read_f64(&body[0..8]),
            format_id,
            format_flags: BigEndian::read_u32(&body[12..16]),
            bytes_per_packet: BigEndian::read_u32(&body[16..20]),
            frames_per_packet: BigEndian::read_u32(&body[20..24]),
            channels_per_frame: BigEndian::read_u32(&body[24..28]),
            bits_per_channel: BigEndian::read_u32(&body[28..32]),
        })
    }

    /// Encode the 32-byte chunk body.
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = vec![0u8; DESC_BODY_SIZE];
        BigEndian::write_f64(&mut body[0..8], self.sample_rate);
        body[8..12].copy_from_slice(&self.format_id);
        BigEndian::write_u32(&mut body[12..16], self.format_flags);
        BigEndian::write_u32(&mut body[16..20], self.bytes_per_packet);
        BigEndian::write_u32(&mut body[20..24], self.frames_per_packet);
        BigEndian::write_u32(&mut body[24..28], self.channels_per_frame);
        BigEndian::write_u32(&mut body[28..32], self.bits_per_channel);
        body
    }
}
