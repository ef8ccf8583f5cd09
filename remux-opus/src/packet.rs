//! Opus packet frame-length decoding.
//!
//! Decodes the four frame-count code paths of RFC 6716 §3.2 into a list
//! of per-frame byte lengths. No frame payload is interpreted.

use crate::error::{OpusError, Result};
use crate::toc::{Channels, OpusConfig, OpusToc};

/// A structurally decoded Opus packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusPacket {
    /// Decoded TOC byte.
    pub toc: OpusToc,
    /// Padding bytes declared by a code 3 packet (0 otherwise).
    pub padding_length: usize,
    /// Byte length of every frame, in order.
    pub frame_lengths: Vec<usize>,
}

impl OpusPacket {
    /// The operating configuration of this packet.
    pub fn config(&self) -> OpusConfig {
        self.toc.config
    }

    /// The channel arrangement of this packet.
    pub fn channels(&self) -> Channels {
        self.toc.channels
    }

    /// Number of frames in this packet.
    pub fn frame_count(&self) -> usize {
        self.frame_lengths.len()
    }
}

/// Read one frame length at `offset` using the 1-or-2-byte coding of
/// RFC 6716 §3.2.1: values 0..=251 stand alone; 252..=255 demand a
/// second byte, giving `second * 4 + first`.
///
/// Returns the length and the number of bytes consumed.
fn read_frame_length(data: &[u8], offset: usize, frame: usize) -> Result<(usize, usize)> {
    let first = *data
        .get(offset)
        .ok_or(OpusError::TruncatedFrameLength { frame })? as usize;
    if first <= 251 {
        return Ok((first, 1));
    }
    let second = *data
        .get(offset + 1)
        .ok_or(OpusError::TruncatedFrameLength { frame })? as usize;
    Ok((second * 4 + first, 2))
}

/// Decode the frame structure of an Opus packet.
pub fn parse_packet(data: &[u8]) -> Result<OpusPacket> {
    let toc_byte = *data.first().ok_or(OpusError::EmptyPacket)?;
    let toc = OpusToc::parse(toc_byte);

    let mut padding_length = 0usize;
    let mut frame_lengths = Vec::new();

    match toc.frame_count_code {
        // One frame spanning the rest of the packet.
        0 => {
            frame_lengths.push(data.len() - 1);
        }
        // Two frames of equal size.
        1 => {
            let payload = data.len() - 1;
            if payload % 2 != 0 {
                return Err(OpusError::UnevenCode1Payload { payload });
            }
            frame_lengths.push(payload / 2);
            frame_lengths.push(payload / 2);
        }
        // Two frames, first length coded explicitly.
        2 => {
            if data.len() < 2 {
                return Err(OpusError::TruncatedCode2);
            }
            if data.len() == 2 && data[1] > 251 {
                return Err(OpusError::InvalidShortCode2);
            }
            let (first_len, coded) = read_frame_length(data, 1, 0)?;
            let header = 1 + coded;
            let available = data.len() - header;
            if first_len > available {
                return Err(OpusError::FrameLengthOverrun {
                    length: first_len,
                    available,
                });
            }
            frame_lengths.push(first_len);
            frame_lengths.push(available - first_len);
        }
        // Arbitrary frame count with optional padding, CBR or VBR.
        _ => {
            if data.len() < 2 {
                return Err(OpusError::TruncatedCode3);
            }
            let frame_count_byte = data[1];
            let frames = (frame_count_byte & 0x3F) as usize;
            let has_padding = frame_count_byte & 0x40 != 0;
            let is_cbr = frame_count_byte & 0x80 != 0;

            if frames == 0 {
                return Err(OpusError::ZeroFrameCount);
            }
            if frames > 48 {
                return Err(OpusError::ExcessiveFrameCount(frame_count_byte & 0x3F));
            }

            let mut offset = 2usize;
            if has_padding {
                let first = *data.get(offset).ok_or(OpusError::TruncatedPadding)? as usize;
                if first == 255 {
                    let second = *data.get(offset + 1).ok_or(OpusError::TruncatedPadding)? as usize;
                    padding_length = 254 + second;
                    offset += 2;
                } else {
                    padding_length = first;
                    offset += 1;
                }
            }

            if data.len() < offset + padding_length {
                return Err(OpusError::TruncatedPadding);
            }

            if is_cbr {
                let payload = data.len() - offset - padding_length;
                if payload % frames != 0 {
                    return Err(OpusError::UnevenCbrPayload { payload, frames });
                }
                frame_lengths.resize(frames, payload / frames);
            } else {
                for frame in 0..frames {
                    let (len, coded) = read_frame_length(data, offset, frame)?;
                    frame_lengths.push(len);
                    offset += coded;
                }
            }
        }
    }

    Ok(OpusPacket {
        toc,
        padding_length,
        frame_lengths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::FrameSize;

    #[test]
    fn test_code_0_single_frame() {
        // TOC 0x08: config 1, mono, code 0.
        let packet = parse_packet(&[0x08, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(packet.frame_lengths, vec![5]);
        assert_eq!(packet.config().index, 1);
        assert_eq!(packet.config().frame_size, FrameSize::Ms20);
        assert_eq!(packet.channels(), Channels::Mono);
    }

    #[test]
    fn test_code_0_empty_frame() {
        let packet = parse_packet(&[0x08]).unwrap();
        assert_eq!(packet.frame_lengths, vec![0]);
    }

    #[test]
    fn test_code_1_equal_frames() {
        let packet = parse_packet(&[0x09, 1, 2, 3, 4]).unwrap();
        assert_eq!(packet.frame_lengths, vec![2, 2]);
    }

    #[test]
    fn test_code_1_uneven_rejected() {
        let err = parse_packet(&[0x09, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, OpusError::UnevenCode1Payload { payload: 3 }));
    }

    #[test]
    fn test_code_2_one_byte_length() {
        // First frame 2 bytes, second frame the remaining 3.
        let packet = parse_packet(&[0x0A, 2, 0xA1, 0xA2, 0xB1, 0xB2, 0xB3]).unwrap();
        assert_eq!(packet.frame_lengths, vec![2, 3]);
    }

    #[test]
    fn test_code_2_two_byte_length() {
        // First length byte 253 escapes: length = 1 * 4 + 253 = 257.
        let mut data = vec![0x0A, 253, 1];
        data.extend(std::iter::repeat(0u8).take(257 + 5));
        let packet = parse_packet(&data).unwrap();
        assert_eq!(packet.frame_lengths, vec![257, 5]);
    }

    #[test]
    fn test_code_2_single_byte_packet_rejected() {
        let err = parse_packet(&[0x0A]).unwrap_err();
        assert!(matches!(err, OpusError::TruncatedCode2));
    }

    #[test]
    fn test_code_2_two_byte_packet_with_escape_rejected() {
        let err = parse_packet(&[0x0A, 252]).unwrap_err();
        assert!(matches!(err, OpusError::InvalidShortCode2));
    }

    #[test]
    fn test_code_2_overrun_rejected() {
        let err = parse_packet(&[0x0A, 10, 1, 2]).unwrap_err();
        assert!(matches!(
            err,
            OpusError::FrameLengthOverrun {
                length: 10,
                available: 2
            }
        ));
    }

    #[test]
    fn test_code_3_cbr() {
        // 3 frames, CBR, no padding: payload 6 bytes -> 2 each.
        let packet = parse_packet(&[0x0B, 0x83, 1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(packet.frame_lengths, vec![2, 2, 2]);
        assert_eq!(packet.padding_length, 0);
    }

    #[test]
    fn test_code_3_cbr_uneven_rejected() {
        let err = parse_packet(&[0x0B, 0x83, 1, 2, 3, 4, 5, 6, 7]).unwrap_err();
        assert!(matches!(
            err,
            OpusError::UnevenCbrPayload {
                payload: 7,
                frames: 3
            }
        ));
    }

    #[test]
    fn test_code_3_vbr() {
        // 2 frames, VBR: lengths 1 and 3.
        let packet = parse_packet(&[0x0B, 0x02, 1, 3, 0xA1, 0xB1, 0xB2, 0xB3]).unwrap();
        assert_eq!(packet.frame_lengths, vec![1, 3]);
    }

    #[test]
    fn test_code_3_padding_single_byte() {
        // CBR, 1 frame, padding flag set, 2 padding bytes.
        let packet = parse_packet(&[0x0B, 0xC1, 2, 9, 9, 9, 0, 0]).unwrap();
        assert_eq!(packet.padding_length, 2);
        assert_eq!(packet.frame_lengths, vec![3]);
    }

    #[test]
    fn test_code_3_padding_escape() {
        // Padding byte 255 escapes to 254 + next.
        let mut data = vec![0x0B, 0xC1, 255, 6];
        data.extend_from_slice(&[1, 2]); // frame payload, 2 bytes
        data.extend(std::iter::repeat(0u8).take(260)); // 254 + 6 padding bytes
        let packet = parse_packet(&data).unwrap();
        assert_eq!(packet.padding_length, 260);
        assert_eq!(packet.frame_lengths, vec![2]);
    }

    #[test]
    fn test_code_3_zero_frames_rejected() {
        let err = parse_packet(&[0x0B, 0x80, 1, 2]).unwrap_err();
        assert!(matches!(err, OpusError::ZeroFrameCount));
    }

    #[test]
    fn test_empty_packet_rejected() {
        assert!(matches!(parse_packet(&[]), Err(OpusError::EmptyPacket)));
    }
}
