//! End-to-end Ogg-Opus parsing and transcoding scenarios.

use remux::{
    CafChunk, MemorySource, OggOpusDemuxer, OggOpusEvent, OggOpusToCaf, PageBuilder, PageReader,
};

/// OpusHead packet: version 1, the given channel count, pre-skip 312,
/// input sample rate 48000, mapping family 0.
fn opus_head_packet(channels: u8) -> Vec<u8> {
    let mut packet = Vec::new();
    packet.extend_from_slice(b"OpusHead");
    packet.push(1);
    packet.push(channels);
    packet.extend_from_slice(&312u16.to_le_bytes());
    packet.extend_from_slice(&48_000u32.to_le_bytes());
    packet.extend_from_slice(&0i16.to_le_bytes());
    packet.push(0);
    packet
}

/// A minimal two-page stream: OpusHead on page 0, one code-0 audio
/// packet with TOC byte 0x08 on page 1.
fn minimal_stream(audio_payload: &[u8]) -> Vec<u8> {
    let mut audio_packet = vec![0x08];
    audio_packet.extend_from_slice(audio_payload);

    let head_page = PageBuilder::new()
        .bos(true)
        .serial_number(0xDECA)
        .sequence_number(0)
        .segment(opus_head_packet(2))
        .build()
        .unwrap();
    let audio_page = PageBuilder::new()
        .serial_number(0xDECA)
        .sequence_number(1)
        .eos(true)
        .granule_position(960)
        .segment(audio_packet)
        .build()
        .unwrap();

    let mut stream = head_page.as_bytes().to_vec();
    stream.extend_from_slice(audio_page.as_bytes());
    stream
}

#[test]
fn two_page_stream_parses_to_head_then_one_audio_packet() {
    let payload = [0xA1, 0xA2, 0xA3, 0xA4, 0xA5];
    let stream = minimal_stream(&payload);

    let mut demuxer = OggOpusDemuxer::new(PageReader::new(MemorySource::new(stream)));
    let events = demuxer.read_to_end().unwrap();
    assert_eq!(events.len(), 2);

    match &events[0] {
        OggOpusEvent::Identification { head, .. } => {
            assert_eq!(head.channel_count, 2);
            assert_eq!(head.pre_skip, 312);
            assert_eq!(head.input_sample_rate, 48_000);
        }
        other => panic!("expected identification event, got {other:?}"),
    }

    match &events[1] {
        OggOpusEvent::Audio { packets, .. } => {
            assert_eq!(packets.len(), 1);
            // Code 0: exactly one frame spanning the bytes after the TOC.
            assert_eq!(packets[0].frame_lengths, vec![payload.len()]);
            assert_eq!(packets[0].config().index, 1);
        }
        other => panic!("expected audio event, got {other:?}"),
    }
}

#[test]
fn transcode_emits_caf_chunks_in_order() {
    let payload = [0xA1, 0xA2, 0xA3, 0xA4, 0xA5];
    let stream = minimal_stream(&payload);

    let transcoder = OggOpusToCaf::new(PageReader::new(MemorySource::new(stream)));
    let caf = transcoder.transcode().unwrap();

    assert_eq!(caf.file_header.file_version, 1);
    assert_eq!(caf.chunks.len(), 4);

    let CafChunk::Desc(desc) = &caf.chunks[0] else {
        panic!("expected desc first, got {:?}", caf.chunks[0]);
    };
    assert_eq!(desc.sample_rate, 48_000.0);
    assert_eq!(&desc.format_id, b"opus");
    assert_eq!(desc.channels_per_frame, 2);

    let CafChunk::Chan(chan) = &caf.chunks[1] else {
        panic!("expected chan second");
    };
    assert_eq!(chan.channel_layout_tag, (101 << 16) | 2);

    let CafChunk::Data(data) = &caf.chunks[2] else {
        panic!("expected data third");
    };
    // The data chunk is the byte-identical concatenation of all audio
    // packets, TOC byte included.
    let mut expected = vec![0x08];
    expected.extend_from_slice(&payload);
    assert_eq!(data.data, expected);
    assert_eq!(data.edit_count, 0);

    let CafChunk::Pakt(pakt) = &caf.chunks[3] else {
        panic!("expected pakt last");
    };
    assert_eq!(pakt.number_packets, 1);
    // One 20 ms packet at 48 kHz is 960 frames.
    assert_eq!(pakt.number_valid_frames, 960);
    assert_eq!(pakt.entries, vec![expected.len() as u64, 960]);
}

#[test]
fn transcoded_stream_decodes_back_chunk_for_chunk() {
    let stream = minimal_stream(&[1, 2, 3]);
    let caf = OggOpusToCaf::new(PageReader::new(MemorySource::new(stream)))
        .transcode()
        .unwrap();
    let chunks = caf.chunks.clone();
    let bytes = caf.into_bytes();

    let mut reader = remux::ChunkReader::new(&bytes).unwrap();
    assert_eq!(reader.file_header().file_version, 1);
    let decoded = reader.read_to_end().unwrap();
    assert_eq!(decoded, chunks);
}

#[test]
fn tolerant_mode_recovers_from_leading_garbage() {
    let payload = [9u8, 8, 7, 6];
    let clean = minimal_stream(&payload);
    let mut dirty = vec![0xFF];
    dirty.extend_from_slice(&clean);

    // Strict mode refuses the stream outright.
    let mut strict = OggOpusDemuxer::new(PageReader::new(MemorySource::new(dirty.clone())));
    assert!(strict.read_to_end().is_err());

    // Tolerant mode skips exactly one byte and parses identically.
    let clean_caf = OggOpusToCaf::new(PageReader::new(MemorySource::new(clean)))
        .transcode()
        .unwrap();
    let dirty_caf = OggOpusToCaf::new(PageReader::tolerant(MemorySource::chunked(dirty, 11)))
        .transcode()
        .unwrap();
    assert_eq!(clean_caf, dirty_caf);
}

#[test]
fn audio_before_identification_is_rejected() {
    let mut audio_packet = vec![0x08];
    audio_packet.extend_from_slice(&[1, 2, 3]);
    let page = PageBuilder::new()
        .bos(true)
        .serial_number(5)
        .sequence_number(0)
        .segment(audio_packet)
        .build()
        .unwrap();

    let transcoder = OggOpusToCaf::new(PageReader::new(MemorySource::new(
        page.as_bytes().to_vec(),
    )));
    assert!(transcoder.transcode().is_err());
}

#[test]
fn multiple_audio_packets_aggregate_into_one_data_chunk() {
    let head_page = PageBuilder::new()
        .bos(true)
        .serial_number(3)
        .sequence_number(0)
        .segment(opus_head_packet(1))
        .build()
        .unwrap();
    // Two audio packets on one page, one on a second page.
    let audio_page_1 = PageBuilder::new()
        .serial_number(3)
        .sequence_number(1)
        .segment(vec![0x08, 1, 1])
        .segment(vec![0x08, 2, 2, 2])
        .build()
        .unwrap();
    let audio_page_2 = PageBuilder::new()
        .serial_number(3)
        .sequence_number(2)
        .eos(true)
        .segment(vec![0x08, 3])
        .build()
        .unwrap();

    let mut stream = head_page.as_bytes().to_vec();
    stream.extend_from_slice(audio_page_1.as_bytes());
    stream.extend_from_slice(audio_page_2.as_bytes());

    let caf = OggOpusToCaf::new(PageReader::new(MemorySource::new(stream)))
        .transcode()
        .unwrap();

    let CafChunk::Data(data) = &caf.chunks[2] else {
        panic!("expected data chunk");
    };
    assert_eq!(
        data.data,
        vec![0x08, 1, 1, 0x08, 2, 2, 2, 0x08, 3]
    );

    let CafChunk::Pakt(pakt) = &caf.chunks[3] else {
        panic!("expected pakt chunk");
    };
    assert_eq!(pakt.number_packets, 3);
    assert_eq!(pakt.number_valid_frames, 3 * 960);
    assert_eq!(pakt.entries, vec![3, 960, 4, 960, 2, 960]);
}
