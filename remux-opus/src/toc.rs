//! Opus table-of-contents byte decoding.
//!
//! The first byte of every Opus packet selects one of 32 fixed
//! operating configurations (coding mode, audio bandwidth, frame
//! duration), a channel flag, and a frame-count code (RFC 6716 §3.1).

/// Opus coding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpusMode {
    /// SILK mode, optimized for speech.
    Silk,
    /// Hybrid SILK + CELT mode.
    Hybrid,
    /// CELT mode, optimized for music.
    Celt,
}

/// Opus audio bandwidth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bandwidth {
    /// Narrowband (4 kHz).
    Narrowband,
    /// Mediumband (6 kHz).
    Mediumband,
    /// Wideband (8 kHz).
    Wideband,
    /// Super-wideband (12 kHz).
    SuperWideband,
    /// Fullband (20 kHz).
    Fullband,
}

/// Opus frame duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSize {
    /// 2.5 ms frames.
    Ms2_5,
    /// 5 ms frames.
    Ms5,
    /// 10 ms frames.
    Ms10,
    /// 20 ms frames.
    Ms20,
    /// 40 ms frames.
    Ms40,
    /// 60 ms frames.
    Ms60,
}

impl FrameSize {
    /// Frame duration in milliseconds.
    pub fn millis(self) -> f64 {
        match self {
            FrameSize::Ms2_5 => 2.5,
            FrameSize::Ms5 => 5.0,
            FrameSize::Ms10 => 10.0,
            FrameSize::Ms20 => 20.0,
            FrameSize::Ms40 => 40.0,
            FrameSize::Ms60 => 60.0,
        }
    }

    /// Number of samples one frame covers at the given sample rate.
    pub fn samples_at(self, sample_rate: u32) -> u64 {
        (self.millis() * f64::from(sample_rate) / 1000.0) as u64
    }
}

/// Channel arrangement signaled by the TOC byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// One channel.
    Mono,
    /// Two channels.
    Stereo,
}

/// One of the 32 fixed Opus operating configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpusConfig {
    /// Configuration index (0-31), the top five TOC bits.
    pub index: u8,
    /// Coding mode.
    pub mode: OpusMode,
    /// Audio bandwidth.
    pub bandwidth: Bandwidth,
    /// Frame duration.
    pub frame_size: FrameSize,
}

use Bandwidth::*;
use FrameSize::*;
use OpusMode::*;

const CONFIGS: [(OpusMode, Bandwidth, FrameSize); 32] = [
    (Silk, Narrowband, Ms10),
    (Silk, Narrowband, Ms20),
    (Silk, Narrowband, Ms40),
    (Silk, Narrowband, Ms60),
    (Silk, Mediumband, Ms10),
    (Silk, Mediumband, Ms20),
    (Silk, Mediumband, Ms40),
    (Silk, Mediumband, Ms60),
    (Silk, Wideband, Ms10),
    (Silk, Wideband, Ms20),
    (Silk, Wideband, Ms40),
    (Silk, Wideband, Ms60),
    (Hybrid, SuperWideband, Ms10),
    (Hybrid, SuperWideband, Ms20),
    (Hybrid, Fullband, Ms10),
    (Hybrid, Fullband, Ms20),
    (Celt, Narrowband, Ms2_5),
    (Celt, Narrowband, Ms5),
    (Celt, Narrowband, Ms10),
    (Celt, Narrowband, Ms20),
    (Celt, Wideband, Ms2_5),
    (Celt, Wideband, Ms5),
    (Celt, Wideband, Ms10),
    (Celt, Wideband, Ms20),
    (Celt, SuperWideband, Ms2_5),
    (Celt, SuperWideband, Ms5),
    (Celt, SuperWideband, Ms10),
    (Celt, SuperWideband, Ms20),
    (Celt, Fullband, Ms2_5),
    (Celt, Fullband, Ms5),
    (Celt, Fullband, Ms10),
    (Celt, Fullband, Ms20),
];

impl OpusConfig {
    /// Look up the configuration for a 5-bit config index.
    ///
    /// A pure function of the index; panics only if `index > 31`, which
    /// cannot happen for a value extracted from a TOC byte.
    pub fn from_index(index: u8) -> Self {
        let (mode, bandwidth, frame_size) = CONFIGS[index as usize];
        Self {
            index,
            mode,
            bandwidth,
            frame_size,
        }
    }
}

/// Decoded TOC byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpusToc {
    /// Operating configuration from the top five bits.
    pub config: OpusConfig,
    /// Channel arrangement flag.
    pub channels: Channels,
    /// Frame count code (0-3).
    pub frame_count_code: u8,
}

impl OpusToc {
    /// Split a TOC byte into its three fields.
    pub fn parse(byte: u8) -> Self {
        Self {
            config: OpusConfig::from_index(byte >> 3),
            channels: if byte & 0x04 != 0 {
                Channels::Stereo
            } else {
                Channels::Mono
            },
            frame_count_code: byte & 0x03,
        }
    }
}
