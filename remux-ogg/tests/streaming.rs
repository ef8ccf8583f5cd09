//! Streaming reader behavior across chunk boundaries and corruption.

use remux_ogg::{ByteSource, MemorySource, PageBuilder, PageReader, SourceChunk};

fn stream_of(pages: usize) -> Vec<u8> {
    let mut stream = Vec::new();
    for i in 0..pages {
        let page = PageBuilder::new()
            .bos(i == 0)
            .eos(i == pages - 1)
            .serial_number(42)
            .sequence_number(i as u32)
            .segment(vec![i as u8; 50 + i])
            .build()
            .unwrap();
        stream.extend_from_slice(page.as_bytes());
    }
    stream
}

#[test]
fn page_boundaries_are_independent_of_chunking() {
    let stream = stream_of(5);

    for chunk_size in [1, 7, 27, 100, 4096] {
        let mut reader = PageReader::new(MemorySource::chunked(stream.clone(), chunk_size));
        let pages = reader.read_to_end().unwrap();
        assert_eq!(pages.len(), 5, "chunk_size {chunk_size}");
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.sequence_number(), i as u32);
            assert_eq!(page.segment(0).unwrap().len(), 50 + i);
        }
    }
}

#[test]
fn tolerant_reader_skips_interior_garbage() {
    let clean = stream_of(3);
    let clean_pages = PageReader::new(MemorySource::new(clean.clone()))
        .read_to_end()
        .unwrap();

    // Garbage between page 0 and page 1.
    let first_size = clean_pages[0].page_size();
    let mut dirty = clean[..first_size].to_vec();
    dirty.extend_from_slice(b"garbage!");
    dirty.extend_from_slice(&clean[first_size..]);

    let mut reader = PageReader::tolerant(MemorySource::chunked(dirty, 13));
    let pages = reader.read_to_end().unwrap();
    assert_eq!(pages.len(), 3);
    assert_eq!(reader.skipped_bytes(), 8);
    for (clean_page, page) in clean_pages.iter().zip(&pages) {
        assert_eq!(clean_page.as_bytes(), page.as_bytes());
    }
}

#[test]
fn tolerant_reader_skips_corrupted_page_entirely() {
    let clean = stream_of(3);
    let clean_pages = PageReader::new(MemorySource::new(clean.clone()))
        .read_to_end()
        .unwrap();

    // Flip a byte inside page 1's body: its checksum no longer matches,
    // so tolerant mode must resync to page 2 without emitting page 1.
    let mut dirty = clean.clone();
    let corrupt_at = clean_pages[0].page_size() + clean_pages[1].page_size() - 1;
    dirty[corrupt_at] ^= 0xFF;

    let mut reader = PageReader::tolerant(MemorySource::new(dirty));
    let pages = reader.read_to_end().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].sequence_number(), 0);
    assert_eq!(pages[1].sequence_number(), 2);
}

/// A source that returns an empty non-final chunk before the data,
/// as a slow producer would.
struct StutteringSource {
    inner: MemorySource,
    stalls: usize,
}

impl ByteSource for StutteringSource {
    fn pull(&mut self) -> std::io::Result<SourceChunk> {
        if self.stalls > 0 {
            self.stalls -= 1;
            return Ok(SourceChunk {
                bytes: Vec::new(),
                is_final: false,
            });
        }
        self.inner.pull()
    }
}

#[test]
fn empty_pulls_do_not_terminate_the_reader() {
    let source = StutteringSource {
        inner: MemorySource::new(stream_of(2)),
        stalls: 3,
    };
    let mut reader = PageReader::new(source);
    let pages = reader.read_to_end().unwrap();
    assert_eq!(pages.len(), 2);
}
