//! Structural page mutation.
//!
//! Each operation re-derives the logical segment list, re-encodes the
//! lacing table, rebuilds the page buffer, and returns a new page with
//! a freshly computed checksum. The source page is never modified.

use byteorder::{ByteOrder, LittleEndian};
use remux_core::crc::crc32;
use remux_core::error::PageError;

use crate::page::{encode_lacing, OggPage, CHECKSUM_OFFSET, MAX_SEGMENTS, MIN_HEADER_SIZE};

impl OggPage {
    /// Remove `count` logical segments starting at `index`.
    pub fn remove_segments(&self, index: usize, count: usize) -> Result<OggPage, PageError> {
        if count == 0 {
            return Err(PageError::EmptyRange);
        }
        let total = self.segment_count();
        if index >= total {
            return Err(PageError::SegmentIndex { index, count: total });
        }
        if index + count > total {
            return Err(PageError::RemoveRange {
                index,
                len: count,
                count: total,
            });
        }

        let mut segments = self.segment_payloads();
        segments.drain(index..index + count);
        self.rebuild(segments)
    }

    /// Insert segments before the segment at `index`.
    ///
    /// `index` equal to the segment count appends at the end.
    pub fn insert_segments(
        &self,
        index: usize,
        new_segments: &[Vec<u8>],
    ) -> Result<OggPage, PageError> {
        let total = self.segment_count();
        if index > total {
            return Err(PageError::SegmentIndex { index, count: total });
        }

        let mut segments = self.segment_payloads();
        segments.splice(index..index, new_segments.iter().cloned());
        self.rebuild(segments)
    }

    /// Replace the segment at `index` with `bytes`.
    ///
    /// Replacement payloads are limited to a single lacing entry
    /// (255 bytes).
    pub fn replace_segment(&self, index: usize, bytes: &[u8]) -> Result<OggPage, PageError> {
        let total = self.segment_count();
        if index >= total {
            return Err(PageError::SegmentIndex { index, count: total });
        }
        if bytes.len() > 255 {
            return Err(PageError::SegmentTooLarge { len: bytes.len() });
        }

        let mut segments = self.segment_payloads();
        segments[index] = bytes.to_vec();
        self.rebuild(segments)
    }

    /// Rebuild this page around a new logical segment list, keeping the
    /// header fields and any continued tail, and recomputing the
    /// checksum.
    fn rebuild(&self, segments: Vec<Vec<u8>>) -> Result<OggPage, PageError> {
        let tail = self.continued_tail();

        let mut lacing = Vec::new();
        for segment in &segments {
            encode_lacing(segment.len(), &mut lacing);
        }
        for _ in 0..tail.len() / 255 {
            lacing.push(255);
        }
        if lacing.len() > MAX_SEGMENTS {
            return Err(PageError::LacingOverflow {
                needed: lacing.len(),
            });
        }

        let body_size: usize = segments.iter().map(Vec::len).sum::<usize>() + tail.len();
        let mut page = Vec::with_capacity(MIN_HEADER_SIZE + lacing.len() + body_size);

        // Header fields carry over unchanged; only the segment table,
        // body, and checksum are rewritten.
        page.extend_from_slice(&self.as_bytes()[..CHECKSUM_OFFSET]);
        page.extend_from_slice(&[0, 0, 0, 0]);
        page.push(lacing.len() as u8);
        page.extend_from_slice(&lacing);
        for segment in &segments {
            page.extend_from_slice(segment);
        }
        page.extend_from_slice(tail);

        let checksum = crc32(&page, 0);
        LittleEndian::write_u32(&mut page[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4], checksum);

        OggPage::parse(&page)
    }
}
