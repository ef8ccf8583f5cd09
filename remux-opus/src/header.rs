//! OpusHead and OpusTags header decoding.
//!
//! The two header packets at the start of an Ogg Opus stream carry the
//! stream parameters and the vendor/comment metadata. Fields are
//! little-endian after the 8-byte magic signature.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{OpusError, Result};
use crate::{OPUS_HEAD_MAGIC, OPUS_TAGS_MAGIC};

/// Channel mapping table for mapping families other than 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMapping {
    /// Number of Opus streams encoded in each Ogg packet.
    pub stream_count: u8,
    /// Number of those streams that are coupled (stereo).
    pub coupled_count: u8,
    /// Output channel to stream mapping, one entry per channel.
    pub mapping: Vec<u8>,
}

/// The OpusHead identification header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusHead {
    /// Encapsulation version; 1 for current streams.
    pub version: u8,
    /// Output channel count. Must be nonzero.
    pub channel_count: u8,
    /// Samples (at 48 kHz) to discard from the decoder output.
    pub pre_skip: u16,
    /// Sample rate of the original input, informational only.
    pub input_sample_rate: u32,
    /// Output gain in Q7.8 dB.
    pub output_gain: i16,
    /// Channel mapping family.
    pub mapping_family: u8,
    /// Mapping table, present for mapping families other than 0.
    pub channel_mapping: Option<ChannelMapping>,
}

impl OpusHead {
    /// Decode an OpusHead packet.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 8 || data[..8] != OPUS_HEAD_MAGIC {
            return Err(OpusError::InvalidIdentification(
                "missing OpusHead signature".into(),
            ));
        }
        if data.len() < 19 {
            return Err(OpusError::InvalidIdentification(format!(
                "header of {} bytes is shorter than the fixed 19-byte layout",
                data.len()
            )));
        }

        let version = data[8];
        let channel_count = data[9];
        if channel_count == 0 {
            return Err(OpusError::InvalidIdentification(
                "channel count must be nonzero".into(),
            ));
        }
        let pre_skip = LittleEndian::read_u16(&data[10..12]);
        let input_sample_rate = LittleEndian::read_u32(&data[12..16]);
        let output_gain = LittleEndian::read_i16(&data[16..18]);
        let mapping_family = data[18];

        let channel_mapping = if data.len() > 19 {
            let needed = 21 + channel_count as usize;
            if data.len() < needed {
                return Err(OpusError::InvalidIdentification(format!(
                    "channel mapping table needs {needed} bytes, have {}",
                    data.len()
                )));
            }
            Some(ChannelMapping {
                stream_count: data[19],
                coupled_count: data[20],
                mapping: data[21..21 + channel_count as usize].to_vec(),
            })
        } else {
            None
        };

        Ok(Self {
            version,
            channel_count,
            pre_skip,
            input_sample_rate,
            output_gain,
            mapping_family,
            channel_mapping,
        })
    }

    /// Playback time in seconds of a page granule position.
    ///
    /// Opus granule positions count 48 kHz samples regardless of the
    /// input sample rate; pre-skip samples are not played.
    pub fn granule_time(&self, granule_position: u64) -> f64 {
        (granule_position.saturating_sub(u64::from(self.pre_skip))) as f64 / 48_000.0
    }
}

/// The OpusTags metadata header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusTags {
    /// Vendor string of the encoding software.
    pub vendor: String,
    /// User comments, in stream order.
    pub comments: Vec<String>,
}

impl OpusTags {
    /// Decode an OpusTags packet.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 8 || data[..8] != OPUS_TAGS_MAGIC {
            return Err(OpusError::InvalidTags("missing OpusTags signature".into()));
        }

        let mut offset = 8usize;
        let vendor = read_length_prefixed(data, &mut offset)
            .ok_or_else(|| OpusError::InvalidTags("truncated vendor string".into()))?;

        let count = read_u32(data, &mut offset)
            .ok_or_else(|| OpusError::InvalidTags("truncated comment count".into()))?;

        let mut comments = Vec::with_capacity(count.min(1024) as usize);
        for i in 0..count {
            let comment = read_length_prefixed(data, &mut offset)
                .ok_or_else(|| OpusError::InvalidTags(format!("truncated comment {i}")))?;
            comments.push(comment);
        }

        Ok(Self { vendor, comments })
    }
}

fn read_u32(data: &[u8], offset: &mut usize) -> Option<u32> {
    let bytes = data.get(*offset..*offset + 4)?;
    *offset += 4;
    Some(LittleEndian::read_u32(bytes))
}

fn read_length_prefixed(data: &[u8], offset: &mut usize) -> Option<String> {
    let len = read_u32(data, offset)? as usize;
    let bytes = data.get(*offset..*offset + len)?;
    *offset += len;
    Some(String::from_utf8_lossy(bytes).into_owned())
}
