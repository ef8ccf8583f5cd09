//! The `data` audio data chunk.

use byteorder::{BigEndian, ByteOrder};
use remux_core::error::ChunkError;

use crate::error::Result;

/// The audio payload: an edit count followed by raw packet bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioData {
    /// Incremented each time the data is modified.
    pub edit_count: u32,
    /// Concatenated audio packet bytes.
    pub data: Vec<u8>,
}

impl AudioData {
    /// Decode a `data` chunk body.
    pub fn decode_body(body: &[u8]) -> Result<Self> {
        if body.len() < 4 {
            return Err(ChunkError::InvalidBody {
                chunk: "data",
                message: format!("body must start with a 4-byte edit count, got {} bytes", body.len()),
            });
        }
        Ok(Self {
            edit_count: BigEndian::read_u32(&body[0..4]),
            data: body[4..].to_vec(),
        })
    }

    /// Encode the chunk body.
    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(4 + self.data.len());
        body.extend_from_slice(&self.edit_count.to_be_bytes());
        body.extend_from_slice(&self.data);
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let data = AudioData {
            edit_count: 0,
            data: vec![1, 2, 3, 4, 5],
        };
        let body = data.encode_body();
        assert_eq!(AudioData::decode_body(&body).unwrap(), data);
    }

    #[test]
    fn test_empty_payload() {
        let data = AudioData {
            edit_count: 2,
            data: Vec::new(),
        };
        let body = data.encode_body();
        assert_eq!(body.len(), 4);
        assert_eq!(AudioData::decode_body(&body).unwrap(), data);
    }

    #[test]
    fn test_short_body_rejected() {
        assert!(matches!(
            AudioData::decode_body(&[0, 0]),
            Err(ChunkError::InvalidBody { chunk: "data", .. })
        ));
    }
}
