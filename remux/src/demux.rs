//! Codec-aware demuxing layered over the page reader.
//!
//! The page reader yields raw pages; the demuxers here classify each
//! page's packets by magic signature and decode header packets,
//! yielding typed events. Audio packets are never decoded beyond their
//! structure.

use std::collections::VecDeque;

use remux_core::error::Result;
use remux_ogg::{ByteSource, OggPage, PageReader};
use remux_opus::{OpusHead, OpusPacket, OpusTags};
use remux_vorbis::{CommentHeader, IdentificationHeader, SetupHeader};
use tracing::{debug, warn};

/// One event from an Ogg Opus stream.
#[derive(Debug, Clone)]
pub enum OggOpusEvent {
    /// The OpusHead identification header.
    Identification {
        /// The page carrying the header packet.
        page: OggPage,
        /// The decoded header.
        head: OpusHead,
    },
    /// The OpusTags metadata header.
    Tags {
        /// The page carrying the tags packet.
        page: OggPage,
        /// The decoded tags.
        tags: OpusTags,
    },
    /// A page of audio packets.
    Audio {
        /// The page the packets came from.
        page: OggPage,
        /// Structurally decoded packets, one per page segment.
        packets: Vec<OpusPacket>,
    },
}

/// Demuxer for Ogg Opus streams.
///
/// Classification is by magic signature: the identification header is
/// expected first, then the tags header, then audio. Once both headers
/// have been seen every packet is treated as audio.
pub struct OggOpusDemuxer<S> {
    reader: PageReader<S>,
    seen_head: bool,
    seen_tags: bool,
}

impl<S: ByteSource> OggOpusDemuxer<S> {
    /// Create a demuxer over a page reader.
    pub fn new(reader: PageReader<S>) -> Self {
        Self {
            reader,
            seen_head: false,
            seen_tags: false,
        }
    }

    /// Produce the next event, or `None` at the end of the stream.
    pub fn next_event(&mut self) -> Result<Option<OggOpusEvent>> {
        while let Some(page) = self.reader.next_page()? {
            if page.segment_count() == 0 {
                debug!(
                    sequence = page.sequence_number(),
                    "skipping page with no complete packets"
                );
                continue;
            }

            let first = page.segment(0)?;
            if !self.seen_head
                && remux_opus::classify_packet(first)
                    == remux_opus::OpusPacketKind::IdentificationHeader
            {
                let head = OpusHead::parse(first)?;
                self.seen_head = true;
                debug!(
                    channels = head.channel_count,
                    sample_rate = head.input_sample_rate,
                    "decoded OpusHead"
                );
                return Ok(Some(OggOpusEvent::Identification { page, head }));
            }

            if !self.seen_tags
                && remux_opus::classify_packet(first) == remux_opus::OpusPacketKind::TagsHeader
            {
                let tags = OpusTags::parse(first)?;
                self.seen_tags = true;
                return Ok(Some(OggOpusEvent::Tags { page, tags }));
            }

            let packets = page
                .segments()
                .map(remux_opus::parse_packet)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            return Ok(Some(OggOpusEvent::Audio { page, packets }));
        }
        Ok(None)
    }

    /// Collect all remaining events.
    pub fn read_to_end(&mut self) -> Result<Vec<OggOpusEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event()? {
            events.push(event);
        }
        Ok(events)
    }
}

/// One event from an Ogg Vorbis stream.
#[derive(Debug, Clone)]
pub enum OggVorbisEvent {
    /// The identification header.
    Identification {
        /// The page carrying the header packet.
        page: OggPage,
        /// The decoded header.
        header: IdentificationHeader,
    },
    /// The comment header.
    Comment {
        /// The page carrying the header packet.
        page: OggPage,
        /// The decoded header.
        header: CommentHeader,
    },
    /// The setup header.
    Setup {
        /// The page carrying the header packet.
        page: OggPage,
        /// The decoded header.
        header: Box<SetupHeader>,
    },
    /// A page holding audio packets.
    Audio {
        /// The audio page; packets stay opaque byte ranges.
        page: OggPage,
    },
}

/// Demuxer for Ogg Vorbis streams.
///
/// The three header packets may share pages, so each page's segments
/// are classified individually; decoding the setup header requires the
/// channel count from the identification header.
pub struct OggVorbisDemuxer<S> {
    reader: PageReader<S>,
    channels: Option<u8>,
    pending: VecDeque<OggVorbisEvent>,
}

impl<S: ByteSource> OggVorbisDemuxer<S> {
    /// Create a demuxer over a page reader.
    pub fn new(reader: PageReader<S>) -> Self {
        Self {
            reader,
            channels: None,
            pending: VecDeque::new(),
        }
    }

    /// Produce the next event, or `None` at the end of the stream.
    pub fn next_event(&mut self) -> Result<Option<OggVorbisEvent>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }

            let Some(page) = self.reader.next_page()? else {
                return Ok(None);
            };

            for i in 0..page.segment_count() {
                let segment = page.segment(i)?;
                match remux_vorbis::classify_packet(segment) {
                    remux_vorbis::VorbisPacketKind::Identification => {
                        let header = IdentificationHeader::parse(segment)?;
                        self.channels = Some(header.audio_channels);
                        self.pending.push_back(OggVorbisEvent::Identification {
                            page: page.clone(),
                            header,
                        });
                    }
                    remux_vorbis::VorbisPacketKind::Comment => {
                        let header = CommentHeader::parse(segment)?;
                        self.pending.push_back(OggVorbisEvent::Comment {
                            page: page.clone(),
                            header,
                        });
                    }
                    remux_vorbis::VorbisPacketKind::Setup => match self.channels {
                        Some(channels) => {
                            let header = SetupHeader::parse(segment, channels)?;
                            self.pending.push_back(OggVorbisEvent::Setup {
                                page: page.clone(),
                                header: Box::new(header),
                            });
                        }
                        None => {
                            warn!("setup packet before identification; skipping");
                        }
                    },
                    remux_vorbis::VorbisPacketKind::Audio => {
                        self.pending
                            .push_back(OggVorbisEvent::Audio { page: page.clone() });
                        break;
                    }
                }
            }
        }
    }

    /// Collect all remaining events.
    pub fn read_to_end(&mut self) -> Result<Vec<OggVorbisEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event()? {
            events.push(event);
        }
        Ok(events)
    }
}
