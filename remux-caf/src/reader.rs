//! Sequential CAF stream reading.

use crate::chunk::CafChunk;
use crate::error::Result;
use crate::head::{FileHeader, FILE_HEADER_SIZE};

/// Sequential decoder over a complete CAF byte stream.
///
/// Reads the file header once, then yields chunks until the buffer is
/// consumed.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    offset: usize,
    file_header: FileHeader,
}

impl<'a> ChunkReader<'a> {
    /// Open a CAF stream, decoding its file header.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let file_header = FileHeader::decode(data)?;
        Ok(Self {
            data,
            offset: FILE_HEADER_SIZE,
            file_header,
        })
    }

    /// The decoded file header.
    pub fn file_header(&self) -> FileHeader {
        self.file_header
    }

    /// Decode the next chunk, or `None` at the end of the stream.
    pub fn next_chunk(&mut self) -> Result<Option<CafChunk>> {
        if self.offset >= self.data.len() {
            return Ok(None);
        }
        let (chunk, consumed) = CafChunk::decode(&self.data[self.offset..])?;
        self.offset += consumed;
        Ok(Some(chunk))
    }

    /// Decode all remaining chunks.
    pub fn read_to_end(&mut self) -> Result<Vec<CafChunk>> {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.next_chunk()? {
            chunks.push(chunk);
        }
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkType;
    use crate::data::AudioData;
    use crate::desc::AudioDescription;

    fn sample_stream() -> Vec<u8> {
        let mut stream = FileHeader::v1().encode();
        stream.extend_from_slice(
            &CafChunk::Desc(AudioDescription {
                sample_rate: 48_000.0,
                format_id: *b"opus",
                format_flags: 0,
                bytes_per_packet: 0,
                frames_per_packet: 0,
                channels_per_frame: 2,
                bits_per_channel: 0,
            })
            .encode(),
        );
        stream.extend_from_slice(
            &CafChunk::Data(AudioData {
                edit_count: 0,
                data: vec![1, 2, 3],
            })
            .encode(),
        );
        stream
    }

    #[test]
    fn test_reads_header_then_chunks() {
        let stream = sample_stream();
        let mut reader = ChunkReader::new(&stream).unwrap();
        assert_eq!(reader.file_header().file_version, 1);

        let chunks = reader.read_to_end().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_type(), ChunkType::DESC);
        assert_eq!(chunks[1].chunk_type(), ChunkType::DATA);
        assert!(reader.next_chunk().unwrap().is_none());
    }

    #[test]
    fn test_truncated_stream_errors() {
        let mut stream = sample_stream();
        stream.truncate(stream.len() - 1);
        let mut reader = ChunkReader::new(&stream).unwrap();
        assert!(reader.next_chunk().is_ok()); // desc is intact
        assert!(reader.next_chunk().is_err()); // data is truncated
    }
}
