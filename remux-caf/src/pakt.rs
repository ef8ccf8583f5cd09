//! The `pakt` packet table chunk.
//!
//! The table header is a fixed 24-byte layout; the per-packet entries
//! are base-128 variable-length integers: 7 data bits per byte, high
//! bit set on every byte except the last of each value.

use byteorder::{BigEndian, ByteOrder};
use remux_core::error::ChunkError;

use crate::error::Result;

/// Size of the fixed packet-table header.
pub const PAKT_HEADER_SIZE: usize = 24;

/// The packet table: timing header plus per-packet entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketTable {
    /// Number of packets described by the table.
    pub number_packets: i64,
    /// Total number of valid audio frames.
    pub number_valid_frames: i64,
    /// Priming frames at the start of the stream.
    pub priming_frames: i32,
    /// Remainder frames at the end of the stream.
    pub remainder_frames: i32,
    /// Variable-length table entries, in order.
    pub entries: Vec<u64>,
}

impl PacketTable {
    /// Decode a `pakt` chunk body.
    pub fn decode_body(body: &[u8]) -> Result<Self> {
        if body.len() < PAKT_HEADER_SIZE {
            return Err(ChunkError::InvalidBody {
                chunk: "pakt",
                message: format!(
                    "body must hold a {PAKT_HEADER_SIZE}-byte header, got {} bytes",
                    body.len()
                ),
            });
        }

        Ok(Self {
            number_packets: BigEndian::read_i64(&body[0..8]),
            number_valid_frames: BigEndian::read_i64(&body[8..16]),
            priming_frames: BigEndian::read_i32(&body[16..20]),
            remainder_frames: BigEndian::read_i32(&body[20..24]),
            entries: decode_varints(&body[PAKT_HEADER_SIZE..])?,
        })
    }

    /// Encode the chunk body.
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(PAKT_HEADER_SIZE + self.entries.len());
        body.extend_from_slice(&self.number_packets.to_be_bytes());
        body.extend_from_slice(&self.number_valid_frames.to_be_bytes());
        body.extend_from_slice(&self.priming_frames.to_be_bytes());
        body.extend_from_slice(&self.remainder_frames.to_be_bytes());
        for &entry in &self.entries {
            encode_varint(entry, &mut body);
        }
        body
    }
}

/// Decode a run of base-128 varints.
fn decode_varints(data: &[u8]) -> Result<Vec<u64>> {
    let mut values = Vec::new();
    let mut current: u64 = 0;
    let mut mid_value = false;

    for &byte in data {
        current = (current << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            values.push(current);
            current = 0;
            mid_value = false;
        } else {
            mid_value = true;
        }
    }

    if mid_value {
        return Err(ChunkError::InvalidBody {
            chunk: "pakt",
            message: "packet table ends inside a variable-length value".into(),
        });
    }

    Ok(values)
}

/// Encode one value as a base-128 varint.
fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    let mut bytes = [0u8; 10];
    let mut used = 0;

    loop {
        bytes[used] = (value & 0x7F) as u8;
        value >>= 7;
        used += 1;
        if value == 0 {
            break;
        }
    }

    for i in (1..used).rev() {
        out.push(bytes[i] | 0x80);
    }
    out.push(bytes[0]);
}
