//! Incremental page assembly over a pull-based byte source.
//!
//! Raw bytes arrive in chunks of arbitrary size. The reader accumulates
//! them until a complete page is buffered, emits it, and advances. In
//! tolerant mode, structurally invalid leading bytes are dropped one at
//! a time until a valid page header is found again; no partial or
//! corrupt page is ever emitted.

use remux_core::error::{PageError, Result};
use tracing::{debug, warn};

use crate::page::OggPage;

/// One pull's worth of bytes from a forward-only source.
#[derive(Debug, Clone)]
pub struct SourceChunk {
    /// The bytes delivered by this pull. May be empty.
    pub bytes: Vec<u8>,
    /// Whether the source has no more bytes after these.
    pub is_final: bool,
}

/// A forward-only, pull-based byte source.
///
/// The reader calls [`pull`](ByteSource::pull) whenever its buffer does
/// not yet hold a complete page; sources never need to support seeking.
pub trait ByteSource {
    /// Pull the next chunk of bytes.
    fn pull(&mut self) -> std::io::Result<SourceChunk>;
}

/// An in-memory byte source that delivers a buffer in fixed-size
/// chunks. Useful for tests and for transcoding already-loaded files.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Vec<u8>,
    offset: usize,
    chunk_size: usize,
}

impl MemorySource {
    /// Deliver `data` in one chunk.
    pub fn new(data: Vec<u8>) -> Self {
        let chunk_size = data.len().max(1);
        Self {
            data,
            offset: 0,
            chunk_size,
        }
    }

    /// Deliver `data` in chunks of at most `chunk_size` bytes.
    pub fn chunked(data: Vec<u8>, chunk_size: usize) -> Self {
        Self {
            data,
            offset: 0,
            chunk_size: chunk_size.max(1),
        }
    }
}

impl ByteSource for MemorySource {
    fn pull(&mut self) -> std::io::Result<SourceChunk> {
        let end = (self.offset + self.chunk_size).min(self.data.len());
        let bytes = self.data[self.offset..end].to_vec();
        self.offset = end;
        Ok(SourceChunk {
            bytes,
            is_final: self.offset >= self.data.len(),
        })
    }
}

/// Reader states, in the order a page normally moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Fewer than the minimum header bytes are buffered.
    AccumulatingHeader,
    /// The header is parsed; waiting for the rest of the page body.
    AccumulatingBody,
    /// A complete page was just emitted.
    PageReady,
    /// Tolerant mode is dropping bytes to find the next page header.
    Resyncing,
    /// The source is exhausted and the buffer is empty.
    Done,
}

/// Incremental Ogg page reader.
///
/// Pulls chunks from a [`ByteSource`], assembles complete pages, and
/// emits them one at a time. Strict readers propagate every structural
/// error; tolerant readers drop one byte and resynchronize.
pub struct PageReader<S> {
    source: S,
    buffer: Vec<u8>,
    tolerant: bool,
    exhausted: bool,
    skipped: u64,
    state: ReaderState,
}

impl<S: ByteSource> PageReader<S> {
    /// Create a strict reader: any structural error aborts.
    pub fn new(source: S) -> Self {
        Self::with_tolerance(source, false)
    }

    /// Create a tolerant reader: malformed leading bytes are skipped
    /// and parsing resumes at the next valid page header.
    pub fn tolerant(source: S) -> Self {
        Self::with_tolerance(source, true)
    }

    fn with_tolerance(source: S, tolerant: bool) -> Self {
        Self {
            source,
            buffer: Vec::new(),
            tolerant,
            exhausted: false,
            skipped: 0,
            state: ReaderState::AccumulatingHeader,
        }
    }

    /// The reader's current state.
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Number of bytes dropped during resynchronization so far.
    pub fn skipped_bytes(&self) -> u64 {
        self.skipped
    }

    /// Whether tolerant-mode resynchronization is enabled.
    pub fn is_tolerant(&self) -> bool {
        self.tolerant
    }

    /// Produce the next complete page, or `None` once the source is
    /// exhausted and the buffer fully consumed.
    pub fn next_page(&mut self) -> Result<Option<OggPage>> {
        loop {
            match OggPage::parse(&self.buffer) {
                Ok(page) => {
                    self.buffer.drain(..page.page_size());
                    self.state = ReaderState::PageReady;
                    debug!(
                        serial = page.serial_number(),
                        sequence = page.sequence_number(),
                        size = page.page_size(),
                        "page assembled"
                    );
                    return Ok(Some(page));
                }
                Err(PageError::IncompleteData { needed, .. }) => {
                    self.state = if self.buffer.len() < crate::page::MIN_HEADER_SIZE {
                        ReaderState::AccumulatingHeader
                    } else {
                        ReaderState::AccumulatingBody
                    };

                    if self.exhausted {
                        if self.buffer.is_empty() {
                            self.state = ReaderState::Done;
                            return Ok(None);
                        }
                        if self.tolerant {
                            warn!(
                                trailing = self.buffer.len(),
                                "discarding trailing bytes of truncated page"
                            );
                            self.skipped += self.buffer.len() as u64;
                            self.buffer.clear();
                            self.state = ReaderState::Done;
                            return Ok(None);
                        }
                        return Err(PageError::IncompleteData {
                            needed,
                            available: self.buffer.len(),
                        }
                        .into());
                    }

                    self.fill()?;
                }
                Err(err) => {
                    if self.tolerant && is_resyncable(&err) {
                        if self.state != ReaderState::Resyncing {
                            warn!(error = %err, "resynchronizing: dropping leading byte");
                        }
                        self.state = ReaderState::Resyncing;
                        self.buffer.remove(0);
                        self.skipped += 1;
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }
    }

    /// Pull one chunk from the source into the buffer.
    fn fill(&mut self) -> Result<()> {
        let chunk = self.source.pull()?;
        if !chunk.bytes.is_empty() {
            self.buffer.extend_from_slice(&chunk.bytes);
        }
        if chunk.is_final {
            self.exhausted = true;
        }
        Ok(())
    }

    /// Collect all remaining pages.
    pub fn read_to_end(&mut self) -> Result<Vec<OggPage>> {
        let mut pages = Vec::new();
        while let Some(page) = self.next_page()? {
            pages.push(page);
        }
        Ok(pages)
    }
}

/// Errors that byte-by-byte resynchronization can skip past.
fn is_resyncable(err: &PageError) -> bool {
    matches!(
        err,
        PageError::MagicSignature
            | PageError::ChecksumMismatch { .. }
            | PageError::SegmentTable(..)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageBuilder;

    fn two_pages() -> Vec<u8> {
        let first = PageBuilder::new()
            .bos(true)
            .serial_number(1)
            .sequence_number(0)
            .segment(vec![0xAA; 10])
            .build()
            .unwrap();
        let second = PageBuilder::new()
            .serial_number(1)
            .sequence_number(1)
            .eos(true)
            .segment(vec![0xBB; 20])
            .build()
            .unwrap();

        let mut stream = first.as_bytes().to_vec();
        stream.extend_from_slice(second.as_bytes());
        stream
    }

    #[test]
    fn test_single_pull() {
        let mut reader = PageReader::new(MemorySource::new(two_pages()));
        let pages = reader.read_to_end().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].sequence_number(), 0);
        assert_eq!(pages[1].sequence_number(), 1);
        assert_eq!(reader.state(), ReaderState::Done);
    }

    #[test]
    fn test_tiny_chunks() {
        // One byte per pull exercises both accumulation states.
        let mut reader = PageReader::new(MemorySource::chunked(two_pages(), 1));
        let pages = reader.read_to_end().unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_strict_garbage_prefix_fails() {
        let mut stream = vec![0x42];
        stream.extend_from_slice(&two_pages());
        let mut reader = PageReader::new(MemorySource::new(stream));
        assert!(reader.next_page().is_err());
    }

    #[test]
    fn test_tolerant_garbage_prefix_resyncs() {
        let mut stream = vec![0x42];
        stream.extend_from_slice(&two_pages());
        let mut reader = PageReader::tolerant(MemorySource::new(stream));
        let pages = reader.read_to_end().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(reader.skipped_bytes(), 1);
    }

    #[test]
    fn test_strict_truncated_tail_errors() {
        let mut stream = two_pages();
        stream.truncate(stream.len() - 3);
        let mut reader = PageReader::new(MemorySource::new(stream));
        assert!(reader.next_page().unwrap().is_some());
        let err = reader.next_page().unwrap_err();
        assert!(err.is_incomplete());
    }

    #[test]
    fn test_tolerant_truncated_tail_drops() {
        let mut stream = two_pages();
        stream.truncate(stream.len() - 3);
        let mut reader = PageReader::tolerant(MemorySource::new(stream));
        assert!(reader.next_page().unwrap().is_some());
        assert!(reader.next_page().unwrap().is_none());
        assert!(reader.skipped_bytes() > 0);
        assert_eq!(reader.state(), ReaderState::Done);
    }

    #[test]
    fn test_empty_source() {
        let mut reader = PageReader::new(MemorySource::new(Vec::new()));
        assert!(reader.next_page().unwrap().is_none());
        assert_eq!(reader.state(), ReaderState::Done);
    }
}
