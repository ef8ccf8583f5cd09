//! Ogg page parsing and construction.

use byteorder::{ByteOrder, LittleEndian};
use remux_core::crc::crc32;
use remux_core::error::PageError;

/// The 4-byte capture pattern at the start of every Ogg page.
pub const CAPTURE_PATTERN: [u8; 4] = *b"OggS";

/// Size of the fixed page header, up to and including the segment count.
pub const MIN_HEADER_SIZE: usize = 27;

/// Maximum number of lacing entries in a page's segment table.
pub const MAX_SEGMENTS: usize = 255;

const CONTINUATION_FLAG: u8 = 0x01;
const BOS_FLAG: u8 = 0x02;
const EOS_FLAG: u8 = 0x04;

/// Byte offset of the checksum field within the page header.
pub(crate) const CHECKSUM_OFFSET: usize = 22;

/// One logical segment's byte range within the page buffer.
#[derive(Debug, Clone, Copy)]
struct SegmentSpan {
    offset: usize,
    len: usize,
}

/// A parsed Ogg page.
///
/// The page owns its byte buffer exclusively; accessors borrow from it
/// and the mutation operations in this crate return new pages rather
/// than modifying this one.
#[derive(Debug, Clone)]
pub struct OggPage {
    buffer: Vec<u8>,
    version: u8,
    header_type: u8,
    granule_position: u64,
    serial_number: u32,
    sequence_number: u32,
    checksum: u32,
    lacing_count: u8,
    segments: Vec<SegmentSpan>,
    continued_tail: usize,
}

impl OggPage {
    /// Parse a single page from the front of `data`.
    ///
    /// `data` may extend past the page; only the page's own bytes are
    /// retained. A buffer that is merely too short yields
    /// [`PageError::IncompleteData`], which signals the caller to supply
    /// more bytes; a wrong capture pattern yields
    /// [`PageError::MagicSignature`].
    pub fn parse(data: &[u8]) -> Result<Self, PageError> {
        let prefix = data.len().min(CAPTURE_PATTERN.len());
        if data[..prefix] != CAPTURE_PATTERN[..prefix] {
            return Err(PageError::MagicSignature);
        }
        if data.len() < MIN_HEADER_SIZE {
            return Err(PageError::IncompleteData {
                needed: MIN_HEADER_SIZE,
                available: data.len(),
            });
        }

        let lacing_count = data[26];
        let header_size = MIN_HEADER_SIZE + lacing_count as usize;
        if data.len() < header_size {
            return Err(PageError::IncompleteData {
                needed: header_size,
                available: data.len(),
            });
        }

        let lacing = &data[MIN_HEADER_SIZE..header_size];
        let body_size: usize = lacing.iter().map(|&b| b as usize).sum();
        let page_size = header_size + body_size;
        if data.len() < page_size {
            return Err(PageError::IncompleteData {
                needed: page_size,
                available: data.len(),
            });
        }

        let stored_checksum = LittleEndian::read_u32(&data[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4]);
        let computed = page_checksum(&data[..page_size]);
        if stored_checksum != computed {
            return Err(PageError::ChecksumMismatch {
                expected: stored_checksum,
                actual: computed,
            });
        }

        let (segments, continued_tail) = walk_lacing(lacing, header_size);

        Ok(Self {
            buffer: data[..page_size].to_vec(),
            version: data[4],
            header_type: data[5],
            granule_position: LittleEndian::read_u64(&data[6..14]),
            serial_number: LittleEndian::read_u32(&data[14..18]),
            sequence_number: LittleEndian::read_u32(&data[18..22]),
            checksum: stored_checksum,
            lacing_count,
            segments,
            continued_tail,
        })
    }

    /// The full page bytes (header, segment table, body).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Total page size in bytes.
    pub fn page_size(&self) -> usize {
        self.buffer.len()
    }

    /// Stream structure version (0 for RFC 3533 streams).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Raw header-type flag byte.
    pub fn header_type(&self) -> u8 {
        self.header_type
    }

    /// Whether the first packet on this page continues an earlier page.
    pub fn is_continuation(&self) -> bool {
        self.header_type & CONTINUATION_FLAG != 0
    }

    /// Whether this is the first page of its logical bitstream.
    pub fn is_bos(&self) -> bool {
        self.header_type & BOS_FLAG != 0
    }

    /// Whether this is the last page of its logical bitstream.
    pub fn is_eos(&self) -> bool {
        self.header_type & EOS_FLAG != 0
    }

    /// Absolute granule position of this page.
    pub fn granule_position(&self) -> u64 {
        self.granule_position
    }

    /// Serial number of the logical bitstream this page belongs to.
    pub fn serial_number(&self) -> u32 {
        self.serial_number
    }

    /// Page sequence number within the logical bitstream.
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// The page checksum as stored in the header.
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Number of raw lacing entries in the segment table.
    pub fn lacing_count(&self) -> u8 {
        self.lacing_count
    }

    /// Number of complete logical segments on this page.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The `i`-th logical segment's bytes.
    pub fn segment(&self, i: usize) -> Result<&[u8], PageError> {
        let span = self.segments.get(i).ok_or(PageError::SegmentIndex {
            index: i,
            count: self.segments.len(),
        })?;
        Ok(&self.buffer[span.offset..span.offset + span.len])
    }

    /// Iterate over the logical segments of this page.
    pub fn segments(&self) -> impl Iterator<Item = &[u8]> {
        self.segments
            .iter()
            .map(|span| &self.buffer[span.offset..span.offset + span.len])
    }

    /// Logical segment lengths, in order.
    pub fn segment_lengths(&self) -> Vec<usize> {
        self.segments.iter().map(|s| s.len).collect()
    }

    /// Whether the page ends with a packet continued on the next page.
    pub fn has_continued_packet(&self) -> bool {
        self.continued_tail > 0
    }

    /// Bytes of the trailing continued packet, if any.
    pub(crate) fn continued_tail(&self) -> &[u8] {
        let end = self.buffer.len();
        &self.buffer[end - self.continued_tail..end]
    }

    /// Logical segment payloads as owned vectors, excluding any
    /// continued tail.
    pub(crate) fn segment_payloads(&self) -> Vec<Vec<u8>> {
        self.segments().map(<[u8]>::to_vec).collect()
    }
}

/// Walk a lacing table into logical segment spans.
///
/// Runs of 255 accumulate into a single logical segment terminated by
/// the next value below 255; a lone 0 is an explicit zero-length
/// packet. A trailing unterminated run is returned as the continued
/// tail length instead of a segment.
fn walk_lacing(lacing: &[u8], body_start: usize) -> (Vec<SegmentSpan>, usize) {
    let mut segments = Vec::new();
    let mut offset = body_start;
    let mut accumulated = 0usize;

    for &lace in lacing {
        if lace == 255 {
            accumulated += 255;
            continue;
        }
        let len = accumulated + lace as usize;
        segments.push(SegmentSpan { offset, len });
        offset += len;
        accumulated = 0;
    }

    (segments, accumulated)
}

/// Encode one logical segment length as lacing values.
///
/// Lengths of 255 or more repeat the value 255; the final value is
/// always below 255, so exact multiples of 255 end with an explicit 0.
pub(crate) fn encode_lacing(len: usize, out: &mut Vec<u8>) {
    for _ in 0..len / 255 {
        out.push(255);
    }
    out.push((len % 255) as u8);
}

/// Compute the checksum of a full page buffer, treating the checksum
/// field as zero.
pub(crate) fn page_checksum(page: &[u8]) -> u32 {
    let acc = crc32(&page[..CHECKSUM_OFFSET], 0);
    let acc = crc32(&[0, 0, 0, 0], acc);
    crc32(&page[CHECKSUM_OFFSET + 4..], acc)
}

/// Builder for constructing pages from field values.
///
/// The builder lays out the header, encodes the lacing table from the
/// supplied packet payloads, and fills in a freshly computed checksum.
#[derive(Debug, Clone, Default)]
pub struct PageBuilder {
    continuation: bool,
    bos: bool,
    eos: bool,
    granule_position: u64,
    serial_number: u32,
    sequence_number: u32,
    segments: Vec<Vec<u8>>,
    continued_tail: Vec<u8>,
}

impl PageBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the first packet as a continuation from the previous page.
    pub fn continuation(mut self, value: bool) -> Self {
        self.continuation = value;
        self
    }

    /// Mark this page as beginning-of-stream.
    pub fn bos(mut self, value: bool) -> Self {
        self.bos = value;
        self
    }

    /// Mark this page as end-of-stream.
    pub fn eos(mut self, value: bool) -> Self {
        self.eos = value;
        self
    }

    /// Set the absolute granule position.
    pub fn granule_position(mut self, value: u64) -> Self {
        self.granule_position = value;
        self
    }

    /// Set the stream serial number.
    pub fn serial_number(mut self, value: u32) -> Self {
        self.serial_number = value;
        self
    }

    /// Set the page sequence number.
    pub fn sequence_number(mut self, value: u32) -> Self {
        self.sequence_number = value;
        self
    }

    /// Append one logical segment (a complete packet on this page).
    pub fn segment(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.segments.push(bytes.into());
        self
    }

    /// Append a trailing partial packet continued on the next page.
    ///
    /// The length must be a nonzero multiple of 255 so that the lacing
    /// table carries no terminator for it.
    pub(crate) fn continued_tail(mut self, bytes: Vec<u8>) -> Self {
        self.continued_tail = bytes;
        self
    }

    /// Assemble the page bytes and parse them into an [`OggPage`].
    pub fn build(self) -> Result<OggPage, PageError> {
        let mut lacing = Vec::new();
        for segment in &self.segments {
            encode_lacing(segment.len(), &mut lacing);
        }
        if !self.continued_tail.is_empty() {
            if self.continued_tail.len() % 255 != 0 {
                return Err(PageError::SegmentTable(format!(
                    "continued tail of {} bytes is not a multiple of 255",
                    self.continued_tail.len()
                )));
            }
            for _ in 0..self.continued_tail.len() / 255 {
                lacing.push(255);
            }
        }
        if lacing.len() > MAX_SEGMENTS {
            return Err(PageError::LacingOverflow {
                needed: lacing.len(),
            });
        }

        let body_size: usize =
            self.segments.iter().map(Vec::len).sum::<usize>() + self.continued_tail.len();
        let mut page = Vec::with_capacity(MIN_HEADER_SIZE + lacing.len() + body_size);

        page.extend_from_slice(&CAPTURE_PATTERN);
        page.push(0); // structure version
        let mut header_type = 0u8;
        if self.continuation {
            header_type |= CONTINUATION_FLAG;
        }
        if self.bos {
            header_type |= BOS_FLAG;
        }
        if self.eos {
            header_type |= EOS_FLAG;
        }
        page.push(header_type);

        let mut scratch = [0u8; 8];
        LittleEndian::write_u64(&mut scratch, self.granule_position);
        page.extend_from_slice(&scratch);
        LittleEndian::write_u32(&mut scratch[..4], self.serial_number);
        page.extend_from_slice(&scratch[..4]);
        LittleEndian::write_u32(&mut scratch[..4], self.sequence_number);
        page.extend_from_slice(&scratch[..4]);
        page.extend_from_slice(&[0, 0, 0, 0]); // checksum placeholder
        page.push(lacing.len() as u8);
        page.extend_from_slice(&lacing);
        for segment in &self.segments {
            page.extend_from_slice(segment);
        }
        page.extend_from_slice(&self.continued_tail);

        let checksum = crc32(&page, 0);
        LittleEndian::write_u32(&mut page[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4], checksum);

        OggPage::parse(&page)
    }
}
