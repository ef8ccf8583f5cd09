//! Streaming Ogg-Opus to CAF transcoding.
//!
//! The transcoder never touches audio samples: it reparents the Opus
//! packets from Ogg pages into CAF chunks, deriving the description,
//! channel layout, and packet table from the headers and packet
//! structure.

use remux_caf::{
    AudioData, AudioDescription, CafChunk, ChannelLayout, FileHeader, PacketTable,
};
use remux_core::error::{Error, Result};
use remux_ogg::{ByteSource, PageReader};
use remux_opus::OpusHead;
use tracing::{debug, info};

use crate::demux::{OggOpusDemuxer, OggOpusEvent};

/// CAF channel layout tags for one through five channels.
///
/// Ogg's three-channel order is L C R, which CAF has no exact tag for;
/// MPEG 3.0 A is the conventional substitute.
const CHANNEL_LAYOUT_TAGS: [u32; 5] = [
    (100 << 16) | 1, // Mono
    (101 << 16) | 2, // Stereo
    (113 << 16) | 3, // MPEG 3.0 A
    (108 << 16) | 4, // Quadraphonic
    (119 << 16) | 5, // MPEG 5.0 C
];

/// Discrete, ordered channels for counts with no standard layout tag.
const DISCRETE_IN_ORDER: u32 = 147 << 16;

fn layout_tag(channel_count: u8) -> u32 {
    CHANNEL_LAYOUT_TAGS
        .get(channel_count as usize - 1)
        .copied()
        .unwrap_or(DISCRETE_IN_ORDER | u32::from(channel_count))
}

/// Counters accumulated while transcoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscodeStats {
    /// Pages consumed from the Ogg stream.
    pub pages: u64,
    /// Audio packets written to the data chunk.
    pub packets: u64,
    /// Audio frames described by the packet table.
    pub frames: u64,
    /// Audio payload bytes written to the data chunk.
    pub data_bytes: u64,
}

/// A complete transcoded CAF stream.
#[derive(Debug, Clone, PartialEq)]
pub struct CafStream {
    /// The 8-byte file header.
    pub file_header: FileHeader,
    /// Chunks in file order: desc, chan, data, pakt.
    pub chunks: Vec<CafChunk>,
}

impl CafStream {
    /// Serialize the full stream to bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut out = self.file_header.encode();
        for chunk in &self.chunks {
            out.extend_from_slice(&chunk.encode());
        }
        out
    }
}

/// Ogg-Opus to CAF transcoder.
pub struct OggOpusToCaf<S> {
    demuxer: OggOpusDemuxer<S>,
    stats: TranscodeStats,
}

impl<S: ByteSource> OggOpusToCaf<S> {
    /// Create a transcoder over a page reader.
    pub fn new(reader: PageReader<S>) -> Self {
        Self {
            demuxer: OggOpusDemuxer::new(reader),
            stats: TranscodeStats::default(),
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> TranscodeStats {
        self.stats
    }

    /// Consume the whole source and produce the CAF stream.
    ///
    /// The identification header must appear before any audio packet;
    /// audio payload and packet-table entries aggregate until the
    /// source is exhausted.
    pub fn transcode(mut self) -> Result<CafStream> {
        let mut head: Option<OpusHead> = None;
        let mut payload: Vec<u8> = Vec::new();
        let mut entries: Vec<u64> = Vec::new();
        let mut valid_frames: u64 = 0;

        while let Some(event) = self.demuxer.next_event()? {
            self.stats.pages += 1;
            match event {
                OggOpusEvent::Identification { head: decoded, .. } => {
                    debug!(
                        channels = decoded.channel_count,
                        pre_skip = decoded.pre_skip,
                        "identification header decoded"
                    );
                    head = Some(decoded);
                }
                OggOpusEvent::Tags { tags, .. } => {
                    debug!(vendor = %tags.vendor, comments = tags.comments.len(), "tags decoded");
                }
                OggOpusEvent::Audio { page, packets } => {
                    let head = head.as_ref().ok_or_else(|| {
                        Error::invalid_param("audio packet before OpusHead header")
                    })?;
                    let sample_rate = head.input_sample_rate;

                    for (segment, packet) in page.segments().zip(&packets) {
                        let frames = packet.frame_count() as u64
                            * packet.config().frame_size.samples_at(sample_rate);

                        payload.extend_from_slice(segment);
                        entries.push(segment.len() as u64);
                        entries.push(frames);

                        valid_frames += frames;
                        self.stats.packets += 1;
                        self.stats.frames += frames;
                        self.stats.data_bytes += segment.len() as u64;
                    }
                }
            }
        }

        let head = head.ok_or_else(|| Error::invalid_param("stream has no OpusHead header"))?;

        info!(
            packets = self.stats.packets,
            frames = valid_frames,
            bytes = payload.len(),
            "transcode complete"
        );

        let chunks = vec![
            CafChunk::Desc(AudioDescription {
                sample_rate: f64::from(head.input_sample_rate),
                format_id: *b"opus",
                format_flags: 0,
                bytes_per_packet: 0,
                frames_per_packet: 0,
                channels_per_frame: u32::from(head.channel_count),
                bits_per_channel: 0,
            }),
            CafChunk::Chan(ChannelLayout::from_tag(layout_tag(head.channel_count))),
            CafChunk::Data(AudioData {
                edit_count: 0,
                data: payload,
            }),
            CafChunk::Pakt(PacketTable {
                number_packets: self.stats.packets as i64,
                number_valid_frames: valid_frames as i64,
                priming_frames: 0,
                remainder_frames: 0,
                entries,
            }),
        ];

        Ok(CafStream {
            file_header: FileHeader::v1(),
            chunks,
        })
    }
}
