//! CAF chunk framing and dispatch.
//!
//! Every chunk after the 8-byte file header is framed as a 4-byte type
//! tag followed by a big-endian signed 64-bit body size. Recognized
//! bodies decode into typed values; anything else is carried as a
//! generic chunk so streams round-trip losslessly.

use byteorder::{BigEndian, ByteOrder};
use remux_core::error::ChunkError;

use crate::chan::ChannelLayout;
use crate::data::AudioData;
use crate::desc::AudioDescription;
use crate::error::Result;
use crate::pakt::PacketTable;

/// Size of the per-chunk framing header (type tag + body size).
pub const CHUNK_HEADER_SIZE: usize = 12;

/// A four-character chunk type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    /// The `desc` audio description chunk.
    pub const DESC: ChunkType = ChunkType(*b"desc");
    /// The `chan` channel layout chunk.
    pub const CHAN: ChunkType = ChunkType(*b"chan");
    /// The `data` audio data chunk.
    pub const DATA: ChunkType = ChunkType(*b"data");
    /// The `pakt` packet table chunk.
    pub const PAKT: ChunkType = ChunkType(*b"pakt");

    /// The tag as a string, with non-ASCII bytes replaced.
    pub fn as_str(&self) -> String {
        self.0.iter().map(|&b| b as char).collect()
    }
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The framing header preceding every chunk body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Chunk type tag.
    pub chunk_type: ChunkType,
    /// Declared body size in bytes.
    pub chunk_size: i64,
}

impl ChunkHeader {
    /// Read a chunk header from the front of `data`.
    pub fn read(data: &[u8]) -> Result<Self> {
        if data.len() < CHUNK_HEADER_SIZE {
            return Err(ChunkError::Truncated {
                declared: CHUNK_HEADER_SIZE as u64,
                available: data.len(),
            });
        }
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&data[..4]);
        let chunk_size = BigEndian::read_i64(&data[4..12]);
        if chunk_size < 0 {
            return Err(ChunkError::NegativeSize(chunk_size));
        }
        Ok(Self {
            chunk_type: ChunkType(tag),
            chunk_size,
        })
    }

    /// Write this header into an output buffer.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.chunk_type.0);
        let mut size = [0u8; 8];
        BigEndian::write_i64(&mut size, self.chunk_size);
        out.extend_from_slice(&size);
    }
}

/// A decoded CAF chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum CafChunk {
    /// `desc`: the audio stream description.
    Desc(AudioDescription),
    /// `chan`: the channel layout.
    Chan(ChannelLayout),
    /// `data`: the audio payload.
    Data(AudioData),
    /// `pakt`: the packet table.
    Pakt(PacketTable),
    /// Any chunk type this crate does not interpret.
    Generic {
        /// The chunk's type tag.
        chunk_type: ChunkType,
        /// The raw chunk body.
        body: Vec<u8>,
    },
}

impl CafChunk {
    /// Decode one chunk from the front of `data`, returning the chunk
    /// and the number of bytes it occupied.
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        let header = ChunkHeader::read(data)?;
        let truncated = ChunkError::Truncated {
            declared: header.chunk_size as u64,
            available: data.len().saturating_sub(CHUNK_HEADER_SIZE),
        };
        let body_len = header.chunk_size as usize;
        let body = CHUNK_HEADER_SIZE
            .checked_add(body_len)
            .and_then(|end| data.get(CHUNK_HEADER_SIZE..end))
            .ok_or(truncated)?;

        let chunk = match header.chunk_type {
            ChunkType::DESC => CafChunk::Desc(AudioDescription::decode_body(body)?),
            ChunkType::CHAN => CafChunk::Chan(ChannelLayout::decode_body(body)?),
            ChunkType::DATA => CafChunk::Data(AudioData::decode_body(body)?),
            ChunkType::PAKT => CafChunk::Pakt(PacketTable::decode_body(body)?),
            chunk_type => CafChunk::Generic {
                chunk_type,
                body: body.to_vec(),
            },
        };

        Ok((chunk, CHUNK_HEADER_SIZE + body_len))
    }

    /// The type tag this chunk encodes under.
    pub fn chunk_type(&self) -> ChunkType {
        match self {
            CafChunk::Desc(_) => ChunkType::DESC,
            CafChunk::Chan(_) => ChunkType::CHAN,
            CafChunk::Data(_) => ChunkType::DATA,
            CafChunk::Pakt(_) => ChunkType::PAKT,
            CafChunk::Generic { chunk_type, .. } => *chunk_type,
        }
    }

    /// Encode this chunk, header included.
    pub fn encode(&self) -> Vec<u8> {
        let body = match self {
            CafChunk::Desc(desc) => desc.encode_body(),
            CafChunk::Chan(chan) => chan.encode_body(),
            CafChunk::Data(data) => data.encode_body(),
            CafChunk::Pakt(pakt) => pakt.encode_body(),
            CafChunk::Generic { body, .. } => body.clone(),
        };

        let mut out = Vec::with_capacity(CHUNK_HEADER_SIZE + body.len());
        ChunkHeader {
            chunk_type: self.chunk_type(),
            chunk_size: body.len() as i64,
        }
        .write(&mut out);
        out.extend_from_slice(&body);
        out
    }
}
